//! Tests for the fixed-layout command payloads

mod common;

use common::*;

#[test]
fn test_every_payload_starts_with_screen_and_opcode() {
    let commands = vec![
        Command::ClearScreen,
        Command::SetBrightness { level: 50 },
        gif_command("a.gif"),
        text_command("hi", ""),
        Command::GetStatus,
    ];

    for command in commands {
        let payload = command.to_payload(9);
        assert_eq!(payload[0], 9, "{:?}", command);
        assert_eq!(payload[1], u8::from(command.command_type()), "{:?}", command);

        let frame = command.to_frame(9).unwrap();
        let bytes = frame.to_bytes();
        assert_eq!(bytes[1], 9);
        assert_eq!(bytes[2], payload[1], "header and payload opcode must agree");
        assert_eq!(bytes[3] as usize, payload.len());
    }
}

#[test]
fn test_payload_lengths() {
    assert_eq!(Command::ClearScreen.to_payload(1).len(), 2);
    assert_eq!(Command::GetStatus.to_payload(1).len(), 2);
    assert_eq!(Command::SetBrightness { level: 0 }.to_payload(1).len(), 3);
    assert_eq!(gif_command("").to_payload(1).len(), 74);
    assert_eq!(text_command("", "").to_payload(1).len(), 75);
}

#[test]
fn test_gif_geometry_is_little_endian() {
    let command = Command::LoadGif {
        x: 0x0102,
        y: 0x0304,
        width: 300,
        height: 0xBEEF,
        filename: "anim/1.gif".to_string(),
    };
    let payload = command.to_payload(2);
    assert_eq!(&payload[..10], &[0x02, 0x01, 0x02, 0x01, 0x04, 0x03, 0x2C, 0x01, 0xEF, 0xBE]);

    let bytes = command.to_frame(2).unwrap().to_bytes();
    assert_eq!(
        hex::encode(&bytes),
        "aa02014a0201020104032c01efbe616e696d2f312e6769660000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000002855"
    );
}

#[test]
fn test_short_filename_is_nul_padded() {
    let payload = gif_command("0123456789").to_payload(1);
    let field = &payload[GIF_FILENAME_OFFSET..];
    assert_eq!(field.len(), FILENAME_SIZE);
    assert_eq!(&field[..10], b"0123456789");
    assert!(field[10..].iter().all(|&b| b == 0));
    assert_eq!(field[10..].len(), 54);
}

#[test]
fn test_long_filename_is_truncated() {
    let filename: String = (0..100).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    let payload = gif_command(&filename).to_payload(1);
    let field = &payload[GIF_FILENAME_OFFSET..];
    assert_eq!(field.len(), FILENAME_SIZE);
    assert_eq!(field, &filename.as_bytes()[..64]);
}

#[test]
fn test_exact_width_filename_has_no_terminator() {
    let filename = "x".repeat(64);
    let payload = gif_command(&filename).to_payload(1);
    assert_eq!(&payload[GIF_FILENAME_OFFSET..], filename.as_bytes());

    match Command::from_payload(&payload).unwrap().1 {
        Command::LoadGif { filename: parsed, .. } => assert_eq!(parsed, filename),
        other => panic!("Expected LoadGif, got {:?}", other),
    }
}

#[test]
fn test_text_length_counts_truncated_bytes() {
    let long = "The quick brown fox jumps over the lazy dog";
    let payload = text_command(long, "").to_payload(1);
    assert_eq!(payload[TEXT_LENGTH_OFFSET], 32);
    assert_eq!(&payload[TEXT_OFFSET..FONT_NAME_OFFSET], &long.as_bytes()[..32]);

    let payload = text_command("Test OK", "").to_payload(1);
    assert_eq!(payload[TEXT_LENGTH_OFFSET], 7);
    assert_eq!(&payload[TEXT_OFFSET..TEXT_OFFSET + 7], b"Test OK");
    assert!(payload[TEXT_OFFSET + 7..FONT_NAME_OFFSET].iter().all(|&b| b == 0));
}

#[test]
fn test_text_length_counts_utf8_bytes() {
    // four two-byte characters
    let payload = text_command("éééé", "").to_payload(1);
    assert_eq!(payload[TEXT_LENGTH_OFFSET], 8);
}

#[test]
fn test_font_name_field() {
    let payload = text_command("Hi", "ComicNeue-Bold").to_payload(1);
    let field = &payload[FONT_NAME_OFFSET..];
    assert_eq!(field.len(), FONT_NAME_SIZE);
    assert_eq!(&field[..14], b"ComicNeue-Bold");
    assert!(field[14..].iter().all(|&b| b == 0));

    let long_font = "f".repeat(40);
    let payload = text_command("Hi", &long_font).to_payload(1);
    assert_eq!(&payload[FONT_NAME_OFFSET..], &long_font.as_bytes()[..32]);
}

#[test]
fn test_colour_and_size_bytes() {
    let command = Command::DisplayText {
        x: 1,
        y: 2,
        font_size: 4,
        color: Rgb::new(0x11, 0x22, 0x33),
        text: "c".to_string(),
        font_name: String::new(),
    };
    let payload = command.to_payload(1);
    assert_eq!(&payload[2..10], &[0x01, 0x00, 0x02, 0x00, 0x04, 0x11, 0x22, 0x33]);
}

#[test]
fn test_commands_serialize_to_json() {
    let json = serde_json::to_value(Command::SetBrightness { level: 80 }).unwrap();
    assert_eq!(json["SetBrightness"]["level"], 80);
    let json = serde_json::to_value(Command::ClearScreen).unwrap();
    assert_eq!(json, "ClearScreen");
}
