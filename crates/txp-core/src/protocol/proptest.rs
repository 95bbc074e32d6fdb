//! Property-based tests for the wire format and negotiation.
//!
//! These tests use proptest to verify:
//! - Frame codec roundtrip for arbitrary payloads
//! - Hello/HelloAck payload roundtrips
//! - Negotiation monotonicity and minimality for arbitrary input pairs

#![cfg(test)]

use proptest::prelude::*;

use crate::constants::{HEADER_LEN, NONCE_LEN};
use crate::protocol::{
    negotiate, Frame, FrameType, HelloAcknowledgement, HelloProposal, ServerLimits,
};

// =============================================================================
// Arbitrary Generators
// =============================================================================

fn arb_frame_type() -> impl Strategy<Value = FrameType> {
    prop_oneof![
        Just(FrameType::Hello),
        Just(FrameType::FileName),
        Just(FrameType::Data),
        Just(FrameType::Done),
        Just(FrameType::HelloAck),
    ]
}

prop_compose! {
    fn arb_proposal()(
        proto_minor in any::<u8>(),
        required_features in 0u8..=0x7F,
        optional_features in 0u8..=0x7F,
        max_frame in any::<u32>(),
        max_chunk in any::<u32>(),
        max_window in any::<u32>(),
        idle_timeout_secs in any::<u16>(),
        heartbeat_secs in any::<u16>(),
        nonce in any::<[u8; NONCE_LEN]>(),
    ) -> HelloProposal {
        HelloProposal {
            proto_minor,
            required_features,
            optional_features,
            max_frame,
            max_chunk,
            max_window,
            idle_timeout_secs,
            heartbeat_secs,
            nonce,
        }
    }
}

prop_compose! {
    fn arb_ack()(
        proto_minor in any::<u8>(),
        accepted_features in 0u32..=0x7F,
        max_frame in any::<u32>(),
        max_chunk in any::<u32>(),
        max_window in any::<u32>(),
        idle_timeout_secs in any::<u16>(),
        heartbeat_secs in any::<u16>(),
        nonce_echo in any::<[u8; NONCE_LEN]>(),
        disabled_features in 0u32..=0x7F,
    ) -> HelloAcknowledgement {
        HelloAcknowledgement {
            proto_minor,
            accepted_features,
            max_frame,
            max_chunk,
            max_window,
            idle_timeout_secs,
            heartbeat_secs,
            nonce_echo,
            disabled_features,
        }
    }
}

prop_compose! {
    fn arb_limits()(
        supported_features in 0u32..=0x7F,
        max_frame in any::<u32>(),
        max_chunk in any::<u32>(),
        max_window in any::<u32>(),
        idle_timeout_secs in any::<u16>(),
        heartbeat_secs in any::<u16>(),
    ) -> ServerLimits {
        ServerLimits {
            supported_features,
            max_frame,
            max_chunk,
            max_window,
            idle_timeout_secs,
            heartbeat_secs,
        }
    }
}

// =============================================================================
// Frame Codec Properties
// =============================================================================

proptest! {
    #[test]
    fn frame_roundtrip(kind in arb_frame_type(), payload in prop::collection::vec(any::<u8>(), 0..4096)) {
        let frame = Frame::new(kind, payload);
        let encoded = frame.encode().unwrap();
        let decoded = Frame::decode_slice(&encoded).unwrap();
        prop_assert_eq!(frame, decoded);
    }

    #[test]
    fn decode_never_panics_on_garbage(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = Frame::decode_slice(&data);
    }

    #[test]
    fn encoded_length_is_header_plus_payload(payload in prop::collection::vec(any::<u8>(), 0..2048)) {
        let frame = Frame::new(FrameType::Data, payload.clone());
        let encoded = frame.encode().unwrap();
        prop_assert_eq!(encoded.len(), HEADER_LEN as usize + payload.len());
    }
}

// =============================================================================
// Hello Payload Properties
// =============================================================================

proptest! {
    #[test]
    fn proposal_roundtrip(proposal in arb_proposal()) {
        let encoded = proposal.encode();
        prop_assert_eq!(HelloProposal::decode(&encoded).unwrap(), proposal);
    }

    #[test]
    fn ack_roundtrip(ack in arb_ack()) {
        let encoded = ack.encode();
        prop_assert_eq!(HelloAcknowledgement::decode(&encoded).unwrap(), ack);
    }
}

// =============================================================================
// Negotiation Properties
// =============================================================================

proptest! {
    /// The negotiated chunk always fits a frame alongside its header.
    #[test]
    fn negotiated_chunk_fits_frame(proposal in arb_proposal(), limits in arb_limits()) {
        if let Ok(negotiated) = negotiate(&proposal, &limits) {
            prop_assert!(
                u64::from(negotiated.max_chunk) + u64::from(HEADER_LEN)
                    <= u64::from(negotiated.max_frame)
            );
            prop_assert!(negotiated.max_chunk >= 1);
        }
    }

    /// Negotiated limits never exceed either side's offer, apart from the
    /// header-plus-one floor on the frame size.
    #[test]
    fn negotiated_limits_are_minimal(proposal in arb_proposal(), limits in arb_limits()) {
        if let Ok(negotiated) = negotiate(&proposal, &limits) {
            let floor = u32::from(HEADER_LEN) + 1;
            prop_assert!(
                negotiated.max_frame <= proposal.max_frame.min(limits.max_frame).max(floor)
            );
            // A zero chunk on either side triggers the default rule instead.
            if proposal.max_chunk != 0 && limits.max_chunk != 0 {
                prop_assert!(negotiated.max_chunk <= proposal.max_chunk.min(limits.max_chunk));
            }
            prop_assert!(negotiated.max_window <= proposal.max_window);
            prop_assert!(negotiated.max_window <= limits.max_window);
        }
    }

    /// Failure happens exactly when required bits exceed support, and the
    /// accepted set is always a subset of both wanted and supported.
    #[test]
    fn feature_accounting_is_exact(proposal in arb_proposal(), limits in arb_limits()) {
        let required = u32::from(proposal.required_features);
        let wanted = required | u32::from(proposal.optional_features);
        match negotiate(&proposal, &limits) {
            Ok(negotiated) => {
                prop_assert_eq!(required & !limits.supported_features, 0);
                prop_assert_eq!(negotiated.accepted_features & !wanted, 0);
                prop_assert_eq!(negotiated.accepted_features & !limits.supported_features, 0);
                prop_assert_eq!(
                    negotiated.disabled_features,
                    wanted & !negotiated.accepted_features
                );
                // Required bits always survive into the accepted set.
                prop_assert_eq!(required & negotiated.accepted_features, required);
            }
            Err(_) => {
                prop_assert!(required & !limits.supported_features != 0);
            }
        }
    }

    /// Same inputs, same outcome.
    #[test]
    fn negotiation_is_deterministic(proposal in arb_proposal(), limits in arb_limits()) {
        let first = negotiate(&proposal, &limits);
        let second = negotiate(&proposal, &limits);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "negotiation outcome changed between runs"),
        }
    }
}
