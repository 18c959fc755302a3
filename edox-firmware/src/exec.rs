//! Top-level wiring: owns the channels, builds the USB device and drives
//! the scanner, mapper, USB and timer futures.

use embassy_futures::select::select4;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_usb::{driver::Driver, Config};
use static_cell::StaticCell;

use crate::{
    firmware_functions::{self, BootloaderFn},
    keymap::Layout,
    mapper::Mapper,
    matrix::{scan_task, MatrixScan, ScanChannel},
    report::HidChannel,
    timer::Scheduler,
    usb::{hid_task, Configurator, State, UsbBuffers},
};

// How many transitions can be queued before blocking the scanner
const SCAN_BUFFER_SIZE: usize = 32;
// How many finished reports can be queued before dropping the oldest
const HID_BUFFER_SIZE: usize = 32;
const TIMER_QUEUE_SIZE: usize = 8;

type ScChannel = ScanChannel<NoopRawMutex, SCAN_BUFFER_SIZE>;
type RpChannel = HidChannel<NoopRawMutex, HID_BUFFER_SIZE>;

static SCAN_CHANNEL: StaticCell<ScChannel> = StaticCell::new();
static HID_CHANNEL: StaticCell<RpChannel> = StaticCell::new();
static SCHEDULER: StaticCell<Scheduler<TIMER_QUEUE_SIZE>> = StaticCell::new();

static USB_CONFIG: StaticCell<Configurator<'static>> = StaticCell::new();
static USB_BUFFERS: StaticCell<UsbBuffers> = StaticCell::new();
static HID_STATE: StaticCell<State> = StaticCell::new();

pub struct KeyboardBuilder<
    D: Driver<'static>,
    S: MatrixScan<ROW_COUNT, COL_COUNT>,
    const ROW_COUNT: usize,
    const COL_COUNT: usize,
> {
    bootloader: Option<BootloaderFn>,
    usb_config: Config<'static>,
    driver: Option<D>,
    scanner: Option<S>,
    layout: Layout<ROW_COUNT, COL_COUNT>,
}

pub struct Keyboard<
    D: Driver<'static>,
    S: MatrixScan<ROW_COUNT, COL_COUNT>,
    const ROW_COUNT: usize,
    const COL_COUNT: usize,
> {
    builder: KeyboardBuilder<D, S, ROW_COUNT, COL_COUNT>,
    scan_channel: &'static ScChannel,
    hid_channel: &'static RpChannel,
    scheduler: &'static Scheduler<TIMER_QUEUE_SIZE>,
}

impl<
        D: Driver<'static> + 'static,
        S: MatrixScan<ROW_COUNT, COL_COUNT>,
        const ROW_COUNT: usize,
        const COL_COUNT: usize,
    > KeyboardBuilder<D, S, ROW_COUNT, COL_COUNT>
{
    pub fn new(
        vid: u16,
        pid: u16,
        driver: D,
        scanner: S,
        layout: Layout<ROW_COUNT, COL_COUNT>,
    ) -> Self {
        Self {
            bootloader: None,
            usb_config: Config::new(vid, pid),
            driver: Some(driver),
            scanner: Some(scanner),
            layout,
        }
    }

    pub fn bootloader(mut self, value: BootloaderFn) -> Self {
        self.bootloader = Some(value);
        self
    }

    pub fn manufacturer(mut self, value: &'static str) -> Self {
        self.usb_config.manufacturer = Some(value);
        self
    }

    pub fn product(mut self, value: &'static str) -> Self {
        self.usb_config.product = Some(value);
        self
    }

    pub fn serial_number(mut self, value: &'static str) -> Self {
        self.usb_config.serial_number = Some(value);
        self
    }

    pub fn max_power(mut self, value: u16) -> Self {
        self.usb_config.max_power = value;
        self
    }

    pub fn build(self) -> Keyboard<D, S, ROW_COUNT, COL_COUNT> {
        Keyboard {
            builder: self,
            scan_channel: SCAN_CHANNEL.init(ScChannel::default()),
            hid_channel: HID_CHANNEL.init(RpChannel::default()),
            scheduler: SCHEDULER.init(Scheduler::default()),
        }
    }
}

impl<
        D: Driver<'static> + 'static,
        S: MatrixScan<ROW_COUNT, COL_COUNT>,
        const ROW_COUNT: usize,
        const COL_COUNT: usize,
    > Keyboard<D, S, ROW_COUNT, COL_COUNT>
{
    /// Callbacks scheduled here run from the timer future, between matrix
    /// transitions.
    pub fn scheduler(&self) -> &'static Scheduler<TIMER_QUEUE_SIZE> {
        self.scheduler
    }

    pub async fn run(mut self) -> ! {
        firmware_functions::handle_bootloader(self.builder.bootloader.take());

        let mut scanner = self.builder.scanner.take().unwrap();
        let driver = self.builder.driver.take().unwrap();

        let usb_config: &'static mut Configurator<'static> =
            USB_CONFIG.init(Configurator::new(self.builder.usb_config));
        let usb_buffers: &'static mut UsbBuffers = USB_BUFFERS.init(UsbBuffers::default());
        let mut usb_builder = usb_config.usb_builder(driver, usb_buffers).unwrap();
        let hid_state: &'static mut State = HID_STATE.init(State::default());

        let usb_config: &'static Configurator<'static> = usb_config;
        let writer = usb_config.add_keyboard_iface(&mut usb_builder, hid_state);

        let mut usb = usb_builder.build();

        let usb_fut = async {
            embassy_futures::join::join(usb.run(), hid_task(writer, self.hid_channel)).await;
        };

        let scan_fut = scan_task(&mut scanner, self.scan_channel);

        let mapper_fut = async {
            let mut mapper = Mapper::new(self.builder.layout, self.hid_channel);
            mapper.run(self.scan_channel).await;
        };

        let timer_fut = self.scheduler.run();

        select4(scan_fut, mapper_fut, usb_fut, timer_fut).await;
        unreachable!()
    }
}
