use crate::command::Command;
use crate::error::LedError;
use crate::packet::{CommandType, Frame, decode, encode};
use crate::palette::Rgb;
use bytes::Bytes;

// Frames captured from the bench script sequence (clear, brightness, text, gif)
const CLEAR_SCREEN_1: &str = "aa01030201030255";
const BRIGHTNESS_80_SCREEN_2: &str = "aa0204030204505655";
const TEXT_HELLO: &str = "aa01024b01020a000a0002ffff000648454c4c4f21000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000006455";
const GIF_ANIM_1: &str = "aa01014a01016000600060006000616e696d2f312e6769660000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000005355";

#[test]
fn test_clear_screen_frame() {
    let frame = Command::ClearScreen.to_frame(1).expect("Failed to build frame");
    assert_eq!(hex::encode(frame.to_bytes()), CLEAR_SCREEN_1);
}

#[test]
fn test_set_brightness_frame() {
    let frame = Command::SetBrightness { level: 80 }
        .to_frame(2)
        .expect("Failed to build frame");
    let bytes = frame.to_bytes();
    assert_eq!(hex::encode(&bytes), BRIGHTNESS_80_SCREEN_2);
    // 0x02 ^ 0x04 ^ 0x50
    assert_eq!(bytes[7], 0x56);
}

#[test]
fn test_display_text_frame() {
    let command = Command::DisplayText {
        x: 10,
        y: 10,
        font_size: 2,
        color: Rgb::YELLOW,
        text: "HELLO!".to_string(),
        font_name: String::new(),
    };
    let frame = command.to_frame(1).expect("Failed to build frame");
    assert_eq!(hex::encode(frame.to_bytes()), TEXT_HELLO);
}

#[test]
fn test_load_gif_frame() {
    let command = Command::LoadGif {
        x: 96,
        y: 96,
        width: 96,
        height: 96,
        filename: "anim/1.gif".to_string(),
    };
    let frame = command.to_frame(1).expect("Failed to build frame");
    assert_eq!(hex::encode(frame.to_bytes()), GIF_ANIM_1);
}

#[test]
fn test_parse_captured_frames() {
    let bytes = hex::decode(TEXT_HELLO).expect("Failed to decode hex");
    let frame = decode(&bytes).expect("Failed to parse frame");

    assert_eq!(frame.screen_id(), 1);
    assert_eq!(frame.command(), CommandType::DisplayText);
    assert_eq!(frame.payload().len(), 75);

    match Command::try_from(&frame).expect("Failed to parse command") {
        Command::DisplayText {
            x,
            y,
            font_size,
            color,
            text,
            font_name,
        } => {
            assert_eq!((x, y), (10, 10));
            assert_eq!(font_size, 2);
            assert_eq!(color, Rgb::YELLOW);
            assert_eq!(text, "HELLO!");
            assert!(font_name.is_empty());
        }
        other => panic!("Expected DisplayText, got {:?}", other),
    }
}

#[test]
fn test_frame_from_bytes_matches_decode() {
    let bytes = Bytes::from(hex::decode(GIF_ANIM_1).expect("Failed to decode hex"));
    let frame = Frame::try_from(bytes.clone()).expect("Failed to parse frame");
    assert_eq!(frame, decode(&bytes).unwrap());
    assert_eq!(Bytes::from(frame), bytes);
}

#[test]
fn test_encode_matches_command_builder() {
    let payload = Command::GetStatus.to_payload(3);
    let bytes = encode(3, CommandType::GetStatus.into(), &payload).unwrap();
    assert_eq!(bytes, Command::GetStatus.to_frame(3).unwrap().to_bytes());
}

#[test]
fn test_encode_rejects_oversized_payload() {
    let payload = vec![0u8; 300];
    match encode(1, 0x01, &payload) {
        Err(LedError::PayloadTooLarge { len }) => assert_eq!(len, 300),
        other => panic!("Expected PayloadTooLarge, got {:?}", other),
    }
}
