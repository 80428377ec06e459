//! # sixrd
//!
//! DHCP client hook helper that brings a 6rd (IPv6 rapid deployment) tunnel
//! up when a lease with option 212 is acquired, and tears it down when the
//! lease is released.
//!
//! ## Flow
//!
//! Each invocation is a single, synchronous state transition:
//!
//! 1. [`decode`] turns the option payload and WAN address into a
//!    [`decode::DecodedOption`]
//! 2. [`derive`] computes the tunnel address, LAN subnet, blackhole target and
//!    gateway as one immutable [`derive::DerivedConfig`]
//! 3. [`lifecycle`] runs the apply or teardown sequence through an
//!    [`exec::Executor`], stopping at the first failure
//!
//! Nothing is persisted between invocations. Teardown re-derives everything
//! from the released lease.

pub mod commands;
pub mod config;
pub mod decode;
pub mod derive;
pub mod error;
pub mod exec;
pub mod ip;
pub mod lifecycle;
pub mod logging;

pub use error::SixrdError;
