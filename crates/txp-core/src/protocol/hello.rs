//! Handshake payloads: the Hello proposal and its acknowledgement.
//!
//! Both payloads have fixed big-endian layouts. Reserved space is written as
//! zero and any nonzero reserved content on decode is a hard failure; the
//! reserved bytes exist only in the wire image, not as struct fields.

use bytes::{Buf, BufMut};

use crate::constants::NONCE_LEN;
use crate::error::{Error, Result};

/// Fixed size of a Hello payload.
///
/// Layout: minor(1) | required-flags(1) | optional-flags(1) | reserved(1) |
/// max-frame(4) | max-chunk(4) | max-window(4) | idle-timeout(2) |
/// heartbeat(2) | nonce(16) | reserved(12).
pub const PROPOSAL_LEN: usize = 48;

/// Fixed size of a HelloAck payload.
///
/// Layout: accepted-minor(1) | reserved(1) | reserved(2) | features(4) |
/// max-frame(4) | max-chunk(4) | max-window(4) | idle-timeout(2) |
/// heartbeat(2) | nonce-echo(16) | disabled-features(4) | reserved(12).
pub const ACK_LEN: usize = 56;

/// The initiator's opening offer of limits and feature requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelloProposal {
    /// Offered protocol minor version.
    pub proto_minor: u8,
    /// Feature bits the initiator cannot work without.
    pub required_features: u8,
    /// Feature bits the initiator would like, best effort.
    pub optional_features: u8,
    /// Largest frame the initiator is willing to handle.
    pub max_frame: u32,
    /// Largest data chunk the initiator is willing to handle.
    pub max_chunk: u32,
    /// Largest window, in outstanding chunks.
    pub max_window: u32,
    /// Idle timeout in seconds, zero for the responder's default.
    pub idle_timeout_secs: u16,
    /// Heartbeat interval in seconds, zero for the responder's default.
    pub heartbeat_secs: u16,
    /// Connection nonce, echoed back by the responder.
    pub nonce: [u8; NONCE_LEN],
}

impl HelloProposal {
    /// Serialize into the fixed wire layout.
    pub fn encode(&self) -> [u8; PROPOSAL_LEN] {
        let mut payload = [0u8; PROPOSAL_LEN];
        let mut buf = &mut payload[..];

        buf.put_u8(self.proto_minor);
        buf.put_u8(self.required_features);
        buf.put_u8(self.optional_features);
        buf.put_u8(0); // reserved
        buf.put_u32(self.max_frame);
        buf.put_u32(self.max_chunk);
        buf.put_u32(self.max_window);
        buf.put_u16(self.idle_timeout_secs);
        buf.put_u16(self.heartbeat_secs);
        buf.put_slice(&self.nonce);
        // trailing 12 reserved bytes stay zero

        payload
    }

    /// Deserialize from the fixed wire layout.
    ///
    /// Fails with [`Error::BadProposalLength`] on any other length and with
    /// [`Error::ReservedFieldNonZero`] when reserved space is not zero. No
    /// partially populated proposal escapes a failure.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != PROPOSAL_LEN {
            return Err(Error::BadProposalLength {
                length: payload.len(),
            });
        }

        let mut buf = payload;
        let proto_minor = buf.get_u8();
        let required_features = buf.get_u8();
        let optional_features = buf.get_u8();
        let reserved = buf.get_u8();
        let max_frame = buf.get_u32();
        let max_chunk = buf.get_u32();
        let max_window = buf.get_u32();
        let idle_timeout_secs = buf.get_u16();
        let heartbeat_secs = buf.get_u16();
        let mut nonce = [0u8; NONCE_LEN];
        buf.copy_to_slice(&mut nonce);

        if reserved != 0 || buf.iter().any(|&b| b != 0) {
            return Err(Error::ReservedFieldNonZero);
        }

        Ok(Self {
            proto_minor,
            required_features,
            optional_features,
            max_frame,
            max_chunk,
            max_window,
            idle_timeout_secs,
            heartbeat_secs,
            nonce,
        })
    }
}

/// The responder's negotiated reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelloAcknowledgement {
    /// Accepted protocol minor version.
    pub proto_minor: u8,
    /// Feature bits in effect for the session.
    pub accepted_features: u32,
    /// Accepted maximum frame size.
    pub max_frame: u32,
    /// Accepted maximum chunk size.
    pub max_chunk: u32,
    /// Accepted maximum window.
    pub max_window: u32,
    /// Accepted idle timeout in seconds.
    pub idle_timeout_secs: u16,
    /// Accepted heartbeat interval in seconds.
    pub heartbeat_secs: u16,
    /// The proposal's nonce, echoed unchanged.
    pub nonce_echo: [u8; NONCE_LEN],
    /// Wanted-but-not-accepted feature bits, reported for observability.
    pub disabled_features: u32,
}

impl HelloAcknowledgement {
    /// Serialize into the fixed wire layout.
    pub fn encode(&self) -> [u8; ACK_LEN] {
        let mut payload = [0u8; ACK_LEN];
        let mut buf = &mut payload[..];

        buf.put_u8(self.proto_minor);
        buf.put_u8(0); // reserved
        buf.put_u16(0); // reserved
        buf.put_u32(self.accepted_features);
        buf.put_u32(self.max_frame);
        buf.put_u32(self.max_chunk);
        buf.put_u32(self.max_window);
        buf.put_u16(self.idle_timeout_secs);
        buf.put_u16(self.heartbeat_secs);
        buf.put_slice(&self.nonce_echo);
        buf.put_u32(self.disabled_features);
        // trailing 12 reserved bytes stay zero

        payload
    }

    /// Deserialize from the fixed wire layout, under the same rules as
    /// [`HelloProposal::decode`].
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != ACK_LEN {
            return Err(Error::BadAckLength {
                length: payload.len(),
            });
        }

        let mut buf = payload;
        let proto_minor = buf.get_u8();
        let reserved0 = buf.get_u8();
        let reserved1 = buf.get_u16();
        let accepted_features = buf.get_u32();
        let max_frame = buf.get_u32();
        let max_chunk = buf.get_u32();
        let max_window = buf.get_u32();
        let idle_timeout_secs = buf.get_u16();
        let heartbeat_secs = buf.get_u16();
        let mut nonce_echo = [0u8; NONCE_LEN];
        buf.copy_to_slice(&mut nonce_echo);
        let disabled_features = buf.get_u32();

        if reserved0 != 0 || reserved1 != 0 || buf.iter().any(|&b| b != 0) {
            return Err(Error::ReservedFieldNonZero);
        }

        Ok(Self {
            proto_minor,
            accepted_features,
            max_frame,
            max_chunk,
            max_window,
            idle_timeout_secs,
            heartbeat_secs,
            nonce_echo,
            disabled_features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FEAT_CHECKSUM, FEAT_IDLE_HEARTBEAT, FEAT_RESUME};

    fn sample_proposal() -> HelloProposal {
        HelloProposal {
            proto_minor: 1,
            required_features: FEAT_CHECKSUM as u8,
            optional_features: (FEAT_RESUME | FEAT_IDLE_HEARTBEAT) as u8,
            max_frame: 65547,
            max_chunk: 65536,
            max_window: 32,
            idle_timeout_secs: 30,
            heartbeat_secs: 10,
            nonce: [0xA5; NONCE_LEN],
        }
    }

    fn sample_ack() -> HelloAcknowledgement {
        HelloAcknowledgement {
            proto_minor: 1,
            accepted_features: FEAT_CHECKSUM | FEAT_IDLE_HEARTBEAT,
            max_frame: 2000,
            max_chunk: 1989,
            max_window: 32,
            idle_timeout_secs: 30,
            heartbeat_secs: 10,
            nonce_echo: [0xA5; NONCE_LEN],
            disabled_features: FEAT_RESUME,
        }
    }

    #[test]
    fn proposal_roundtrip() {
        let proposal = sample_proposal();
        let encoded = proposal.encode();
        assert_eq!(encoded.len(), PROPOSAL_LEN);
        assert_eq!(HelloProposal::decode(&encoded).unwrap(), proposal);
    }

    #[test]
    fn proposal_layout_offsets() {
        let encoded = sample_proposal().encode();
        assert_eq!(encoded[0], 1);
        assert_eq!(encoded[3], 0);
        assert_eq!(&encoded[4..8], &65547u32.to_be_bytes());
        assert_eq!(&encoded[8..12], &65536u32.to_be_bytes());
        assert_eq!(&encoded[16..18], &30u16.to_be_bytes());
        assert_eq!(&encoded[20..36], &[0xA5; NONCE_LEN]);
        assert_eq!(&encoded[36..48], &[0u8; 12]);
    }

    #[test]
    fn proposal_rejects_wrong_length() {
        let encoded = sample_proposal().encode();
        assert!(matches!(
            HelloProposal::decode(&encoded[..PROPOSAL_LEN - 1]),
            Err(Error::BadProposalLength { .. })
        ));

        let mut long = encoded.to_vec();
        long.push(0);
        assert!(matches!(
            HelloProposal::decode(&long),
            Err(Error::BadProposalLength { length: 49 })
        ));
    }

    #[test]
    fn proposal_rejects_nonzero_reserved_byte() {
        let mut encoded = sample_proposal().encode();
        encoded[3] = 1;
        assert!(matches!(
            HelloProposal::decode(&encoded),
            Err(Error::ReservedFieldNonZero)
        ));
    }

    #[test]
    fn proposal_rejects_nonzero_reserved_block() {
        for offset in 36..48 {
            let mut encoded = sample_proposal().encode();
            encoded[offset] = 0xFF;
            assert!(
                matches!(
                    HelloProposal::decode(&encoded),
                    Err(Error::ReservedFieldNonZero)
                ),
                "reserved byte at offset {offset} must be enforced"
            );
        }
    }

    #[test]
    fn ack_roundtrip() {
        let ack = sample_ack();
        let encoded = ack.encode();
        assert_eq!(encoded.len(), ACK_LEN);
        assert_eq!(HelloAcknowledgement::decode(&encoded).unwrap(), ack);
    }

    #[test]
    fn ack_layout_offsets() {
        let encoded = sample_ack().encode();
        assert_eq!(encoded[0], 1);
        assert_eq!(&encoded[1..4], &[0u8; 3]);
        assert_eq!(
            &encoded[4..8],
            &(FEAT_CHECKSUM | FEAT_IDLE_HEARTBEAT).to_be_bytes()
        );
        assert_eq!(&encoded[8..12], &2000u32.to_be_bytes());
        assert_eq!(&encoded[12..16], &1989u32.to_be_bytes());
        assert_eq!(&encoded[24..40], &[0xA5; NONCE_LEN]);
        assert_eq!(&encoded[40..44], &FEAT_RESUME.to_be_bytes());
        assert_eq!(&encoded[44..56], &[0u8; 12]);
    }

    #[test]
    fn ack_rejects_wrong_length() {
        let encoded = sample_ack().encode();
        assert!(matches!(
            HelloAcknowledgement::decode(&encoded[..ACK_LEN - 1]),
            Err(Error::BadAckLength { .. })
        ));
    }

    #[test]
    fn ack_rejects_nonzero_reserved() {
        // Reserved byte right after the accepted minor (scenario from the
        // protocol's forward-compatibility contract).
        let mut encoded = sample_ack().encode();
        encoded[1] = 0x01;
        assert!(matches!(
            HelloAcknowledgement::decode(&encoded),
            Err(Error::ReservedFieldNonZero)
        ));

        let mut encoded = sample_ack().encode();
        encoded[2] = 0x01;
        assert!(matches!(
            HelloAcknowledgement::decode(&encoded),
            Err(Error::ReservedFieldNonZero)
        ));

        let mut encoded = sample_ack().encode();
        encoded[50] = 0x01;
        assert!(matches!(
            HelloAcknowledgement::decode(&encoded),
            Err(Error::ReservedFieldNonZero)
        ));
    }
}
