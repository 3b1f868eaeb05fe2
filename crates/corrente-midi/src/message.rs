//! The message catalogue.
//!
//! Every decodable message gets one tag in a single dense numeric space,
//! so consumers can dispatch on (or bit-map over) raw codes:
//!
//! - `0x00..=0x7F` -- control-change and channel-mode tags, keyed directly
//!   by the controller data byte. Control-change messages are never
//!   surfaced as a generic "control change"; the controller number *is*
//!   the tag.
//! - `0x80..=0x87` -- channel voice messages (note-off first).
//! - `0x90..=0x9F` -- system common (`0x90..=0x97`) and system realtime
//!   (`0x98..=0x9F`) messages.
//! - `0xA0..=0x11F` -- meta events, keyed by `0xA0 + meta byte`.
//!
//! Reserved codes inside these bands are carried as
//! [`Message::Undefined`]; [`Message::code`] and [`Message::from_code`]
//! round-trip the numeric value either way.

use serde::{Deserialize, Serialize};

/// First channel voice tag (note-off).
pub const CHANNEL_VOICE_BASE: u16 = 0x80;
/// First system tag (system exclusive).
pub const SYSTEM_BASE: u16 = 0x90;
/// First system realtime tag (timing clock).
pub const REALTIME_BASE: u16 = 0x98;
/// First meta tag (sequence number); a meta byte is offset by this.
pub const META_BASE: u16 = 0xA0;

macro_rules! catalogue {
    ($( $code:literal => $variant:ident, $name:literal; )*) => {
        /// One decoded message tag. See the module docs for the numeric
        /// layout.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Message {
            $( $variant, )*
            /// A reserved or unassigned code inside the catalogue bands.
            Undefined(u16),
        }

        impl Message {
            /// Tag for a raw catalogue code.
            pub fn from_code(code: u16) -> Self {
                match code {
                    $( $code => Message::$variant, )*
                    other => Message::Undefined(other),
                }
            }

            /// The raw catalogue code. Stable across versions; consumers
            /// may compare and index on it.
            pub fn code(&self) -> u16 {
                match *self {
                    $( Message::$variant => $code, )*
                    Message::Undefined(code) => code,
                }
            }

            /// Diagnostic name.
            pub fn name(&self) -> &'static str {
                match *self {
                    $( Message::$variant => $name, )*
                    Message::Undefined(_) => "undefined",
                }
            }
        }
    };
}

catalogue! {
    // Control change, MSBs
    0x00 => BankSelectMsb, "bank-select-msb";
    0x01 => ModulationWheelMsb, "modulation-wheel-msb";
    0x02 => BreathControlMsb, "breath-control-msb";
    0x04 => FootControllerMsb, "foot-controller-msb";
    0x05 => PortamentoTimeMsb, "portamento-time-msb";
    0x06 => DataEntryMsb, "data-entry-msb";
    0x07 => ChannelVolumeMsb, "channel-volume-msb";
    0x08 => BalanceMsb, "balance-msb";
    0x0A => PanMsb, "pan-msb";
    0x0B => ExpressionControllerMsb, "expression-controller-msb";
    0x0C => EffectControl1Msb, "effect-control-1-msb";
    0x0D => EffectControl2Msb, "effect-control-2-msb";
    0x10 => GeneralPurpose1Msb, "general-purpose-1-msb";
    0x11 => GeneralPurpose2Msb, "general-purpose-2-msb";
    0x12 => GeneralPurpose3Msb, "general-purpose-3-msb";
    0x13 => GeneralPurpose4Msb, "general-purpose-4-msb";

    // Control change, LSBs
    0x20 => BankSelectLsb, "bank-select-lsb";
    0x21 => ModulationWheelLsb, "modulation-wheel-lsb";
    0x22 => BreathControlLsb, "breath-control-lsb";
    0x24 => FootControllerLsb, "foot-controller-lsb";
    0x25 => PortamentoTimeLsb, "portamento-time-lsb";
    0x26 => DataEntryLsb, "data-entry-lsb";
    0x27 => ChannelVolumeLsb, "channel-volume-lsb";
    0x28 => BalanceLsb, "balance-lsb";
    0x2A => PanLsb, "pan-lsb";
    0x2B => ExpressionControllerLsb, "expression-controller-lsb";
    0x2C => EffectControl1Lsb, "effect-control-1-lsb";
    0x2D => EffectControl2Lsb, "effect-control-2-lsb";
    0x30 => GeneralPurpose1Lsb, "general-purpose-1-lsb";
    0x31 => GeneralPurpose2Lsb, "general-purpose-2-lsb";
    0x32 => GeneralPurpose3Lsb, "general-purpose-3-lsb";
    0x33 => GeneralPurpose4Lsb, "general-purpose-4-lsb";

    // Control change, switches and single-byte controllers
    0x40 => DamperPedal, "damper-pedal";
    0x41 => Portamento, "portamento";
    0x42 => Sostenuto, "sostenuto";
    0x43 => SoftPedal, "soft-pedal";
    0x44 => LegatoFootswitch, "legato-footswitch";
    0x45 => Hold2, "hold-2";
    0x46 => SoundController1, "sound-controller-1";
    0x47 => SoundController2, "sound-controller-2";
    0x48 => SoundController3, "sound-controller-3";
    0x49 => SoundController4, "sound-controller-4";
    0x4A => SoundController5, "sound-controller-5";
    0x4B => SoundController6, "sound-controller-6";
    0x4C => SoundController7, "sound-controller-7";
    0x4D => SoundController8, "sound-controller-8";
    0x4E => SoundController9, "sound-controller-9";
    0x4F => SoundController10, "sound-controller-10";
    0x50 => GeneralPurpose5, "general-purpose-5";
    0x51 => GeneralPurpose6, "general-purpose-6";
    0x52 => GeneralPurpose7, "general-purpose-7";
    0x53 => GeneralPurpose8, "general-purpose-8";
    0x54 => PortamentoControl, "portamento-control";
    0x5B => Effects1Depth, "effects-1-depth";
    0x5C => Effects2Depth, "effects-2-depth";
    0x5D => Effects3Depth, "effects-3-depth";
    0x5E => Effects4Depth, "effects-4-depth";
    0x5F => Effects5Depth, "effects-5-depth";
    0x60 => DataIncrement, "data-increment";
    0x61 => DataDecrement, "data-decrement";
    0x62 => NrpnLsb, "nrpn-lsb";
    0x63 => NrpnMsb, "nrpn-msb";
    0x64 => RpnLsb, "rpn-lsb";
    0x65 => RpnMsb, "rpn-msb";

    // Channel mode
    0x78 => AllSoundOff, "all-sound-off";
    0x79 => ResetAllControllers, "reset-all-controllers";
    0x7A => LocalControl, "local-control";
    0x7B => AllNotesOff, "all-notes-off";
    0x7C => OmniModeOff, "omni-mode-off";
    0x7D => OmniModeOn, "omni-mode-on";
    0x7E => MonoModeOn, "mono-mode-on";
    0x7F => PolyModeOn, "poly-mode-on";

    // Channel voice
    0x80 => NoteOff, "note-off";
    0x81 => NoteOn, "note-on";
    0x82 => PolyKeyPressure, "poly-key-pressure";
    0x83 => ControlChange, "control-change";
    0x84 => ProgramChange, "program-change";
    0x85 => ChannelPressure, "channel-pressure";
    0x86 => PitchWheel, "pitch-wheel";

    // System common
    0x90 => SystemExclusive, "system-exclusive";
    0x92 => SongPositionPointer, "song-position-pointer";
    0x93 => SongSelect, "song-select";
    0x96 => TuneRequest, "tune-request";
    0x97 => EndOfExclusive, "end-of-exclusive";

    // System realtime
    0x98 => TimingClock, "timing-clock";
    0x9A => Start, "start";
    0x9B => Continue, "continue";
    0x9C => Stop, "stop";
    0x9E => ActiveSensing, "active-sensing";
    0x9F => Reset, "reset";

    // Meta events (0xA0 + meta byte)
    0xA0 => MetaSequenceNumber, "meta-sequence-number";
    0xA1 => MetaText, "meta-text";
    0xA2 => MetaCopyright, "meta-copyright";
    0xA3 => MetaTrackName, "meta-track-name";
    0xA4 => MetaInstrumentName, "meta-instrument-name";
    0xA5 => MetaLyric, "meta-lyric";
    0xA6 => MetaMarker, "meta-marker";
    0xA7 => MetaCuePoint, "meta-cue-point";
    0xC0 => MetaChannelPrefix, "meta-channel-prefix";
    0xCF => MetaEndOfTrack, "meta-end-of-track";
    0xF1 => MetaSetTempo, "meta-set-tempo";
    0xF4 => MetaSmpteOffset, "meta-smpte-offset";
    0xF8 => MetaTimeSignature, "meta-time-signature";
    0xF9 => MetaKeySignature, "meta-key-signature";
    0x11F => MetaSequencerSpecific, "meta-sequencer-specific";
}

impl Message {
    /// Tag selected by a control-change message's first data byte.
    #[inline]
    pub fn from_controller(controller: u8) -> Self {
        Self::from_code(u16::from(controller))
    }

    /// Tag selected by the byte following a meta status byte.
    #[inline]
    pub fn from_meta(meta: u8) -> Self {
        Self::from_code(META_BASE + u16::from(meta))
    }

    /// Whether events with this tag carry a channel.
    #[inline]
    pub fn has_channel(&self) -> bool {
        self.code() < SYSTEM_BASE
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Message::Undefined(code) => write!(f, "undefined({code:#x})"),
            _ => f.write_str(self.name()),
        }
    }
}

/// One of the 16 MIDI channels. Channel-less messages use
/// `Option<Channel>::None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Ch1,
    Ch2,
    Ch3,
    Ch4,
    Ch5,
    Ch6,
    Ch7,
    Ch8,
    Ch9,
    Ch10,
    Ch11,
    Ch12,
    Ch13,
    Ch14,
    Ch15,
    Ch16,
}

impl Channel {
    const ALL: [Channel; 16] = [
        Channel::Ch1,
        Channel::Ch2,
        Channel::Ch3,
        Channel::Ch4,
        Channel::Ch5,
        Channel::Ch6,
        Channel::Ch7,
        Channel::Ch8,
        Channel::Ch9,
        Channel::Ch10,
        Channel::Ch11,
        Channel::Ch12,
        Channel::Ch13,
        Channel::Ch14,
        Channel::Ch15,
        Channel::Ch16,
    ];

    /// Channel from the low nibble of a status byte (masked to 0-15).
    #[inline]
    pub fn from_index(index: u8) -> Self {
        Self::ALL[usize::from(index & 0x0F)]
    }

    /// Zero-based wire index.
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// One-based channel number as musicians count them.
    #[inline]
    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ch{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The band anchors are a wire-compatibility contract.
    #[test]
    fn test_band_anchors() {
        assert_eq!(Message::NoteOff.code(), 0x80);
        assert_eq!(Message::SystemExclusive.code(), 0x90);
        assert_eq!(Message::TimingClock.code(), 0x98);
        assert_eq!(Message::MetaSequenceNumber.code(), 0xA0);
        assert_eq!(Message::MetaSetTempo.code(), 0xA0 + 0x51);
        assert_eq!(Message::MetaEndOfTrack.code(), 0xA0 + 0x2F);
    }

    #[test]
    fn test_code_roundtrip() {
        for code in 0u16..0x120 {
            let message = Message::from_code(code);
            assert_eq!(message.code(), code);
        }
        assert_eq!(Message::from_code(0x03), Message::Undefined(0x03));
        assert_eq!(Message::from_code(0x91), Message::Undefined(0x91));
    }

    #[test]
    fn test_controller_and_meta_mapping() {
        assert_eq!(Message::from_controller(0x07), Message::ChannelVolumeMsb);
        assert_eq!(Message::from_controller(0x7B), Message::AllNotesOff);
        assert_eq!(Message::from_meta(0x01), Message::MetaText);
        assert_eq!(Message::from_meta(0x7F), Message::MetaSequencerSpecific);
    }

    #[test]
    fn test_has_channel() {
        assert!(Message::NoteOn.has_channel());
        assert!(Message::ChannelVolumeMsb.has_channel());
        assert!(!Message::SystemExclusive.has_channel());
        assert!(!Message::MetaText.has_channel());
    }

    #[test]
    fn test_channel_numbering() {
        assert_eq!(Channel::from_index(0), Channel::Ch1);
        assert_eq!(Channel::from_index(15), Channel::Ch16);
        assert_eq!(Channel::from_index(0x90 & 0x0F), Channel::Ch1);
        assert_eq!(Channel::Ch10.number(), 10);
        assert_eq!(Channel::Ch10.index(), 9);
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&Message::NoteOn).unwrap();
        assert_eq!(serde_json::from_str::<Message>(&json).unwrap(), Message::NoteOn);

        let json = serde_json::to_string(&Message::Undefined(0x55)).unwrap();
        assert_eq!(
            serde_json::from_str::<Message>(&json).unwrap(),
            Message::Undefined(0x55)
        );

        let json = serde_json::to_string(&Channel::Ch7).unwrap();
        assert_eq!(serde_json::from_str::<Channel>(&json).unwrap(), Channel::Ch7);
    }
}
