//! `oddsfeed` resolves market and outcome identifiers of a sports odds feed into localized,
//! human-readable names.
//!
//! # Overview
//!
//! Feed messages reference markets by numeric id and carry *specifiers* (e.g. `total=2.5`,
//! `variant=sr:correct_score:bestof:12`) that parametrize them. Turning those into display names
//! needs three things:
//!
//! - Market descriptions: name templates, outcomes and mappings per market, kept by the caches in
//!   [`cache`]. [`MarketCacheProvider`](cache::MarketCacheProvider) composes the invariant
//!   catalog, the shared variant outcome lists and on-demand single-variant descriptions into one
//!   lookup, and picks the [mapping](market::Mapping) whose [validator](mapping) accepts the
//!   specifiers.
//! - Name templates such as `"{!periodnr} period - total {total}"`, evaluated by the
//!   [`expression`] engine against the specifiers, the sport event and player profiles.
//! - [`NameProvider`](name_provider::NameProvider), which binds both to one market of one sport
//!   event and answers "what is the name of this market/outcome in this language".
//!
//! The REST provider and the entity caches for sport events and player profiles live outside of
//! this crate. They are plugged in through [`MarketDescriptionFetcher`](fetcher::MarketDescriptionFetcher),
//! [`SportEvent`](entities::SportEvent) and [`ProfileCache`](entities::ProfileCache).
//!
//! # Error Handling
//!
//! Name generation failures are represented by the [`Error`] enum. Whether they reach the caller
//! is decided by [`ExceptionHandlingStrategy`]: `Catch` logs them and returns `None`, `Throw`
//! returns them as is.
//!
//! # Logging
//!
//! The crate uses the [`log`](https://docs.rs/log/latest/log/) crate with the `oddsfeed` target.
//! Consider integrating a `log`-compatible logger implementation for better visibility into cache
//! refreshes and swallowed failures.
//!
//! # Runtime
//!
//! Caches are async and refresh in tokio tasks, so [`MarketCacheProvider::start`](cache::MarketCacheProvider::start)
//! must be called within a tokio runtime.

#![warn(rustdoc::missing_crate_level_docs)]

pub mod cache;
pub mod config;
pub mod entities;
pub mod expression;
pub mod fetcher;
pub mod mapping;
pub mod market;
pub mod name_provider;
pub mod specifiers;

mod error;
mod score;
mod urn;

pub use config::{ExceptionHandlingStrategy, MarketCacheConfig};
pub use error::{Error, FormatError, Result};
pub use name_provider::{MarketNameProvider, NameProvider, NameProviderFactory};
pub use score::Score;
pub use specifiers::{parse_specifiers, Specifiers};
pub use urn::Urn;
