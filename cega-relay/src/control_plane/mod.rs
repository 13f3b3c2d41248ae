/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Control-plane layer.
//!
//! Owns which origins the engine consumes from. Only the four known origins can
//! be registered, each at most once; anything not registered is never consumed.
//!
//! ```
//! use cega_relay::{channel_source, Origin, RelayConfig, RelayEngine, RelayError};
//!
//! let mut engine = RelayEngine::new(RelayConfig::default());
//! let (_inbox_tx, inbox) = channel_source(8);
//! let (_dup_tx, duplicate) = channel_source(8);
//!
//! engine.add_origin(Origin::Inbox, inbox).unwrap();
//! assert!(matches!(
//!     engine.add_origin(Origin::Inbox, duplicate),
//!     Err(RelayError::OriginAlreadyRegistered(Origin::Inbox))
//! ));
//! assert!(engine.remove_origin(Origin::Inbox).is_ok());
//! assert!(engine.remove_origin(Origin::Inbox).is_err());
//! ```

pub(crate) mod origin_table;
