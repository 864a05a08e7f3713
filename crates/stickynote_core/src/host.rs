//! Host integration entry points.
//!
//! # Responsibility
//! - Hand out shared service handles, one per surface.
//! - Bind a service to a storage key: rehydrate, then persist on change.
//! - Tear down every note across several services.
//!
//! # Invariants
//! - Malformed or unreadable stored state never fails a mount; the surface
//!   starts empty instead.
//! - Rehydration happens before persistence is installed, so a reload does
//!   not write back unchanged state.
//! - Teardown is best-effort and never panics on a busy handle.

use crate::config::WidgetConfig;
use crate::model::note::{decode_records, encode_records, NoteRecord};
use crate::service::NoteService;
use crate::storage::SharedStorage;
use crate::surface::SharedSurface;
use log::{error, info, warn};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to one surface's note service.
pub type NoteServiceHandle = Rc<RefCell<NoteService>>;

/// Creates a note service for `surface` with `config` defaults.
pub fn create(surface: SharedSurface, config: &WidgetConfig) -> NoteServiceHandle {
    Rc::new(RefCell::new(NoteService::new(surface, config.clone())))
}

/// Loads `key` from `storage` into the service and installs a persistence
/// hook that writes the record list back under the same key.
///
/// Returns the number of notes restored.
pub fn mount(handle: &NoteServiceHandle, storage: &SharedStorage, key: &str) -> usize {
    let records = read_records(storage, key);
    let restored = handle.borrow_mut().load_notes(records);

    let storage = Rc::clone(storage);
    let key_owned = key.to_string();
    handle
        .borrow_mut()
        .set_persistence(move |records: &[NoteRecord]| {
            persist(&storage, &key_owned, records)
        });

    info!("event=surface_mount module=host status=ok key={key} restored={restored}");
    restored
}

/// Removes every note of every service, each with a single save.
pub fn remove_all(handles: &[NoteServiceHandle]) {
    for (index, handle) in handles.iter().enumerate() {
        match handle.try_borrow_mut() {
            Ok(mut service) => service.remove_all(),
            Err(err) => {
                error!(
                    "event=remove_all module=host status=skipped index={index} error={err}"
                );
            }
        }
    }
}

fn read_records(storage: &SharedStorage, key: &str) -> Vec<NoteRecord> {
    let payload = match storage.borrow().get(key) {
        Ok(Some(payload)) => payload,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!("event=surface_load module=host status=recovered reason=storage key={key} error={err}");
            return Vec::new();
        }
    };

    match decode_records(&payload) {
        Ok(records) => records,
        Err(err) => {
            warn!("event=surface_load module=host status=recovered reason=malformed key={key} error={err}");
            Vec::new()
        }
    }
}

fn persist(storage: &SharedStorage, key: &str, records: &[NoteRecord]) {
    let payload = match encode_records(records) {
        Ok(payload) => payload,
        Err(err) => {
            error!("event=surface_save module=host status=error key={key} error={err}");
            return;
        }
    };
    if let Err(err) = storage.borrow_mut().set(key, &payload) {
        error!("event=surface_save module=host status=error key={key} error={err}");
    }
}
