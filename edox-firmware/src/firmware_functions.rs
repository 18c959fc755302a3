//! Functions specific to the firmware.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;

pub type BootloaderFn = &'static (dyn Fn() + Sync);

struct Functions {
    bootloader: Option<BootloaderFn>,
}

const fn default_functions() -> Functions {
    Functions { bootloader: None }
}

static FUNCTIONS: CriticalSectionMutex<RefCell<Functions>> =
    CriticalSectionMutex::new(RefCell::new(default_functions()));

/// Hand control to the hardware bootloader. Irreversible; does nothing if no
/// handler is registered.
pub fn jump_to_bootloader() {
    FUNCTIONS.lock(|r| {
        let mut guard = r.borrow_mut();
        if let Some(f) = guard.bootloader.take() {
            f();
        }
    });
}

/// Register the function that will reboot the MCU into its bootloader when
/// [jump_to_bootloader] is called.
pub fn handle_bootloader(value: Option<BootloaderFn>) {
    FUNCTIONS.lock(|r| {
        let mut guard = r.borrow_mut();
        guard.bootloader = value;
    });
}
