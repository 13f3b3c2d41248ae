//! Stable `event=` names.

pub const ENGINE_START: &str = "engine_start";
pub const ENGINE_STOP: &str = "engine_stop";
pub const ENGINE_ABORT: &str = "engine_abort";

pub const ORIGIN_REGISTER: &str = "origin_register";
pub const ORIGIN_REGISTER_REJECTED: &str = "origin_register_rejected";

pub const INGRESS_LOOP_START: &str = "ingress_loop_start";
pub const INGRESS_LOOP_STOP: &str = "ingress_loop_stop";
pub const INGRESS_RECEIVE: &str = "ingress_receive";
pub const INGRESS_DECODE_FAILED: &str = "ingress_decode_failed";
pub const INGRESS_SOURCE_FAILED: &str = "ingress_source_failed";

pub const TRANSFORM_APPLIED: &str = "transform_applied";

pub const BARRIER_INGEST: &str = "barrier_ingest";
pub const BARRIER_INGEST_REJECTED: &str = "barrier_ingest_rejected";
pub const BARRIER_RELEASE: &str = "barrier_release";

pub const EGRESS_SEND_ATTEMPT: &str = "egress_send_attempt";
pub const EGRESS_SEND_OK: &str = "egress_send_ok";
pub const EGRESS_SEND_FAILED: &str = "egress_send_failed";
pub const EGRESS_SEND_TIMEOUT: &str = "egress_send_timeout";
