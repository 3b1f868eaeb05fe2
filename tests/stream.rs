//! End-to-end decoding: bytes through the ring transport, events out of
//! the parser, across chunk boundaries and ring wraparounds.

use std::io::Cursor;

use corrente::midi::vlq;
use corrente::{Channel, Error, EventParser, Message, StreamDecoder};

type OwnedEvent = (Message, Option<Channel>, u64, Vec<u8>);

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A delta-timed stream several times larger than the ring, touching
/// every decoder path: channel voice, control change, sysex, meta,
/// an oversized skipped payload, and a realtime message.
fn fixture_stream() -> Vec<u8> {
    let mut stream = Vec::new();
    let push_delta = |stream: &mut Vec<u8>, delta: u32| {
        let (buf, len) = vlq::encode(delta);
        stream.extend_from_slice(&buf[..len]);
    };

    for i in 0..2000u32 {
        let note = 0x30 + (i % 24) as u8;
        // The timing clock below is terminated by the next delta's first
        // byte, so leading deltas must keep their high bit set.
        push_delta(&mut stream, 0x80 + (i % 300));
        stream.extend_from_slice(&[0x90 | (i % 16) as u8, note, 0x64]);
        push_delta(&mut stream, 0x40);
        stream.extend_from_slice(&[0x80 | (i % 16) as u8, note, 0x00]);

        match i % 7 {
            0 => {
                push_delta(&mut stream, 2);
                stream.extend_from_slice(&[0xB0, 0x07, 0x50]); // channel volume
            }
            1 => {
                push_delta(&mut stream, 0);
                stream.extend_from_slice(&[0xF0, 0x04, 0x7D, 0x01, 0x02, 0x03]);
            }
            2 => {
                push_delta(&mut stream, 0);
                stream.extend_from_slice(&[0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
            }
            3 => {
                // Oversized marker: skipped, never surfaced.
                push_delta(&mut stream, 1);
                stream.extend_from_slice(&[0xFF, 0x06, 0x87, 0x68]); // length 1000
                stream.extend(std::iter::repeat(0x2E).take(1000));
            }
            4 => {
                push_delta(&mut stream, 0);
                stream.push(0xF8); // timing clock, empty payload
            }
            _ => {}
        }
    }
    // End-of-track meta; its delta keeps the high bit set so it also
    // terminates a trailing timing clock.
    stream.extend_from_slice(&[0x81, 0x00, 0xFF, 0x2F, 0x00]);
    stream
}

/// Reference decoding straight through the parser, no ring involved.
fn reference_events(stream: &[u8]) -> Vec<OwnedEvent> {
    let mut parser = EventParser::new(true);
    let mut window = stream;
    let mut events = Vec::new();
    loop {
        let parsed = parser.parse(window, true).unwrap();
        if let Some(event) = &parsed.event {
            events.push((event.kind, event.channel, event.time, event.data.to_vec()));
        }
        let done = parsed.event.is_none();
        window = &window[parsed.consumed..];
        if done {
            assert!(window.is_empty());
            break;
        }
    }
    events
}

fn drain(decoder: &mut StreamDecoder, events: &mut Vec<OwnedEvent>) {
    while let Some(event) = decoder.next_event().unwrap() {
        events.push((event.kind, event.channel, event.time, event.data.to_vec()));
    }
}

#[test]
fn test_chunked_push_matches_reference() {
    init_logging();
    let stream = fixture_stream();
    let reference = reference_events(&stream);
    assert!(reference.iter().any(|(kind, ..)| *kind == Message::MetaSetTempo));
    assert!(reference.iter().all(|(kind, ..)| *kind != Message::MetaMarker));

    for chunk_size in [1usize, 7, 257, 4099] {
        let mut decoder = StreamDecoder::new(true).unwrap();
        assert!(
            stream.len() > decoder.capacity() * 3,
            "fixture must force several wraparounds"
        );

        let mut events = Vec::new();
        let mut offset = 0;
        while offset < stream.len() {
            let end = (offset + chunk_size).min(stream.len());
            offset += decoder.push(&stream[offset..end]);
            drain(&mut decoder, &mut events);
        }
        decoder.finish();
        drain(&mut decoder, &mut events);

        assert_eq!(events.len(), reference.len(), "chunk size {chunk_size}");
        assert_eq!(events, reference, "chunk size {chunk_size}");
    }
}

#[test]
fn test_fill_from_reader() {
    init_logging();
    let stream = fixture_stream();
    let reference = reference_events(&stream);
    let mut cursor = Cursor::new(&stream);

    let mut decoder = StreamDecoder::new(true).unwrap();
    let mut events = Vec::new();
    loop {
        let n = decoder.fill_from(&mut cursor).unwrap();
        if n == 0 && decoder.buffered() == 0 {
            break;
        }
        if n == 0 && cursor.position() as usize == stream.len() {
            decoder.finish();
        }
        drain(&mut decoder, &mut events);
    }
    decoder.finish();
    drain(&mut decoder, &mut events);

    assert_eq!(events, reference);
}

#[test]
fn test_live_stream_without_timing() {
    let mut decoder = StreamDecoder::new(false).unwrap();
    decoder.push(&[0x90, 0x40, 0x64, 0xF8, 0x80, 0x40, 0x00, 0xF2, 0x01, 0x02]);

    let mut events = Vec::new();
    drain(&mut decoder, &mut events);
    // The trailing song-position-pointer is still waiting for its
    // terminator; the first three events are out already.
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].0, Message::NoteOn);
    assert_eq!(events[1].0, Message::TimingClock);
    assert_eq!(events[2].0, Message::NoteOff);
    assert!(events.iter().all(|(_, _, time, _)| *time == 0));

    decoder.finish();
    drain(&mut decoder, &mut events);
    assert_eq!(events.len(), 4);
    assert_eq!(events[3].0, Message::SongPositionPointer);
    assert_eq!(events[3].3, vec![0x01, 0x02]);
}

#[test]
fn test_truncated_stream_is_reported() {
    let mut decoder = StreamDecoder::new(true).unwrap();
    decoder.push(&[0x00, 0x90, 0x40]);
    assert!(decoder.next_event().unwrap().is_none());
    decoder.finish();
    match decoder.next_event() {
        Err(Error::TruncatedStream { remaining }) => assert_eq!(remaining, 2),
        other => panic!("expected TruncatedStream, got {other:?}"),
    }
}

#[test]
fn test_malformed_stream_is_fatal() {
    let mut decoder = StreamDecoder::new(true).unwrap();
    // Delta-time, then a data byte where a status byte must be.
    decoder.push(&[0x00, 0x42, 0x40, 0x64]);
    match decoder.next_event() {
        Err(Error::Decode(e)) => {
            assert_eq!(e, corrente::DecodeError::StatusHighBitClear(0x42));
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn test_push_reports_backpressure() {
    let mut decoder = StreamDecoder::new(true).unwrap();
    let blob = vec![0u8; decoder.capacity() + 100];
    let accepted = decoder.push(&blob);
    assert_eq!(accepted, decoder.capacity());
    assert_eq!(decoder.push(&blob[accepted..]), 0);
}

#[test]
fn test_time_accessor_tracks_deltas() {
    let mut decoder = StreamDecoder::new(true).unwrap();
    decoder.push(&[0x81, 0x00, 0x90, 0x40, 0x64, 0x10, 0x80, 0x40, 0x00]);
    decoder.finish();
    let mut events = Vec::new();
    drain(&mut decoder, &mut events);
    assert_eq!(events.len(), 2);
    assert_eq!(decoder.time(), 0x90);
}
