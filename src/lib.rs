//! Reactive control panels with named, persistent configuration slots.
//!
//! A [`library::Library`] owns the option registry and keybind dispatcher.
//! Tabs create typed options (toggle, slider, dropdown, colorpicker, keybind,
//! input) that other code reads, writes and subscribes to; a
//! [`persistence::SaveManager`] snapshots them into a [`store::DurableStore`].

#![forbid(unsafe_code)]

pub mod color;
pub mod config;
pub mod constants;
pub mod gui;
pub mod hotkeys;
pub mod interface;
pub mod library;
pub mod notify;
pub mod options;
pub mod persistence;
pub mod registry;
pub mod store;
