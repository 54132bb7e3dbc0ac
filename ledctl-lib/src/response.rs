use crate::constants::{MAX_PAYLOAD_SIZE, RESPONSE_HEADER_SIZE};
use crate::error::LedError;
use crate::packet::{CommandType, Frame};
use bytes::{BufMut, Bytes, BytesMut};
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Status the controller reports for the last command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResponseCode {
    Ok = 0x00,
    Error = 0x01,
    FileNotFound = 0x02,
    InvalidParams = 0x03,
    ProtocolError = 0x04,

    #[num_enum(catch_all)]
    Unknown(u8),
}

/// Structured reading of a controller response.
///
/// Payload layout: screen_id, 0x80, response_code, data_length, data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub screen_id: u8,
    pub code: ResponseCode,
    #[serde(serialize_with = "serialize_hex")]
    pub data: Bytes,
}

impl Response {
    pub fn new(screen_id: u8, code: ResponseCode, data: impl Into<Bytes>) -> Self {
        Self {
            screen_id,
            code,
            data: data.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == ResponseCode::Ok
    }

    /// Payload as the controller would send it; data beyond what fits a frame is dropped
    pub fn to_payload(&self) -> Bytes {
        let data_len = self.data.len().min(MAX_PAYLOAD_SIZE - RESPONSE_HEADER_SIZE);
        let mut buf = BytesMut::with_capacity(RESPONSE_HEADER_SIZE + data_len);
        buf.put_u8(self.screen_id);
        buf.put_u8(CommandType::Response.into());
        buf.put_u8(self.code.into());
        buf.put_u8(data_len as u8);
        buf.put_slice(&self.data[..data_len]);
        buf.freeze()
    }

    pub fn to_frame(&self) -> Result<Frame, LedError> {
        Frame::new(self.screen_id, CommandType::Response, self.to_payload())
    }
}

impl TryFrom<&Frame> for Response {
    type Error = LedError;

    fn try_from(frame: &Frame) -> Result<Self, Self::Error> {
        if frame.command() != CommandType::Response {
            return Err(LedError::Protocol(format!(
                "Expected a response frame, got {}",
                frame.command()
            )));
        }

        let payload = frame.payload();
        if payload.len() < RESPONSE_HEADER_SIZE {
            return Err(LedError::InvalidPayload {
                command: CommandType::Response,
                expected: RESPONSE_HEADER_SIZE,
                actual: payload.len(),
            });
        }

        // Controllers have been seen declaring more data than they send; keep what arrived
        let declared = payload[3] as usize;
        let end = (RESPONSE_HEADER_SIZE + declared).min(payload.len());

        Ok(Self {
            screen_id: payload[0],
            code: ResponseCode::from_primitive(payload[2]),
            data: payload.slice(RESPONSE_HEADER_SIZE..end),
        })
    }
}

fn serialize_hex<S: serde::Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(data))
}
