//! pos-screens
//!
//! The three terminal screens and the machinery they share.
//!
//! - [`customer`] and [`kitchen`] are [`poller::ScreenModel`]s driven by the
//!   [`poller::ScreenDriver`] loop.
//! - [`staff`] is a command-driven session around a cart.
//! - [`notify`], [`sequencer`], [`assets`] and [`render`] are the pieces the
//!   screens are built from.

pub mod assets;
pub mod customer;
pub mod kitchen;
pub mod notify;
pub mod poller;
pub mod render;
pub mod sequencer;
pub mod staff;

pub use assets::{Asset, AssetCatalog};
pub use customer::{CustomerScreen, CustomerView};
pub use kitchen::{KitchenScreen, KitchenView};
pub use notify::{ReadyAlert, ReadyNotifier};
pub use poller::{
    fetch_snapshot, FrameSink, PollReport, PollSettings, ScreenDriver, ScreenInput, ScreenModel,
    Snapshot,
};
pub use sequencer::{PollSequencer, PollTicket};
pub use staff::{Receipt, StaffCommand, StaffError, StaffReply, StaffSession, HELP};
