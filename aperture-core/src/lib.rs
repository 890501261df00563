//! # Aperture Core
//!
//! Core library for the Aperture photo-sharing backend, providing the
//! authentication token lifecycle, role-based access control, and the
//! deterministic rating/tag logic those gates protect.
//!
//! ## Overview
//!
//! `aperture-core` deliberately owns the security-sensitive heart of the
//! service and nothing else:
//!
//! - **Token Service**: signed access/refresh tokens with scope separation,
//!   refresh rotation and reuse detection, one-shot email-confirmation tokens
//! - **Account Lifecycle**: signup, login preconditions, email confirmation,
//!   ban/unban, profile updates
//! - **Access Control**: non-hierarchical role allow-lists layered with
//!   per-resource ownership checks
//! - **Rating Aggregation**: star-selection validation and score averaging
//! - **Tag Normalization**: canonicalization and the per-image attach cap
//!
//! Persistence, HTTP routing, mail delivery and cloud image storage are
//! external collaborators reached through the traits in [`store`].
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use aperture_core::{
//!     AccountStore, AuthService, PasswordCrypto, TokenConfig, TokenService,
//! };
//!
//! async fn login(
//!     store: Arc<dyn AccountStore>,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TokenConfig::from_parts("change-me", "HS256", None, None, None)?;
//!     let auth = AuthService::new(store, TokenService::new(config), PasswordCrypto::new()?);
//!
//!     let pair = auth.login("alice@example.com", "correct horse").await?;
//!     let subject = auth.tokens().verify_access_token(&pair.access_token)?;
//!     assert_eq!(subject, "alice@example.com");
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Account model, roles and signup validation
pub mod account;

/// Authentication: password hashing, token service, ban gate, account flows
pub mod auth;

/// Shared error taxonomy pieces
pub mod error;

/// Role allow-lists and ownership-layered authorization
pub mod rbac;

/// Star-rating validation and aggregation
pub mod ratings;

/// Collaborator traits for the persistence layer
pub mod store;

/// Tag normalization and the per-image attach cap
pub mod tags;

pub use account::{Account, NewAccount, ProfileUpdate, Role};
pub use auth::crypto::{PasswordCrypto, PasswordCryptoError};
pub use auth::service::{AuthError, AuthService, EmailConfirmation, TokenPair};
pub use auth::tokens::{TokenConfig, TokenError, TokenScope, TokenService};
pub use auth::AuthenticationError;
pub use error::{NotFound, ValidationError};
pub use rbac::{authorize, authorize_owned, AuthorizationError, Principal};
pub use ratings::{average_rating, Rating, RatingError, RatingService, StarSelection};
pub use store::{AccountStore, ImageRef, ImageStore, RatingStore, TagStore};
pub use tags::{normalize_tags, Tag, TagAttachment, TagError, TagService};
