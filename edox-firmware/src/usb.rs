//! USB composition: device builder, the NKRO keyboard interface and the
//! writer task that drains finished reports onto the interrupt endpoint.

use core::mem::MaybeUninit;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_usb::{
    control::{InResponse, OutResponse, Recipient, Request, RequestType},
    driver::{Driver, Endpoint, EndpointError, EndpointIn},
    types::InterfaceNumber,
    Builder, Config, Handler,
};

use crate::report::{HidChannel, REPORT_SIZE};

const HID_DESC_DESCTYPE_HID: u8 = 0x21;
const HID_DESC_DESCTYPE_HID_REPORT: u8 = 0x22;
const HID_DESC_SPEC_1_11: [u8; 2] = [0x11, 0x01];
const HID_DESC_COUNTRY_UNSPEC: u8 = 0x00;

const HID_REQ_SET_IDLE: u8 = 0x0a;
const HID_REQ_GET_PROTOCOL: u8 = 0x03;
const HID_REQ_SET_PROTOCOL: u8 = 0x0b;

/// NKRO keyboard: report id, 8 modifier bits, 256-bit key bitmap, plus the
/// host-to-device LED output bits.
#[rustfmt::skip]
pub const KEYBOARD_REPORT_DESC: [u8; 59] = [
    0x05, 0x01, // (GLOBAL) USAGE_PAGE         0x0001 Generic Desktop Page
    0x09, 0x06, // (LOCAL)  USAGE              0x00010006 Keyboard (Application Collection)
    0xA1, 0x01, // (MAIN) COLLECTION 0x01 Application
    0x85, 0x01, //   (GLOBAL) REPORT_ID          0x01 (1)
    0x05, 0x07, //   (GLOBAL) USAGE_PAGE         0x0007 Keyboard/Keypad Page
    0x19, 0xE0, //   (LOCAL)  USAGE_MINIMUM      0x000700E0 Keyboard LeftControl
    0x29, 0xE7, //   (LOCAL)  USAGE_MAXIMUM      0x000700E7 Keyboard Right GUI
    0x15, 0x00, //   (GLOBAL) LOGICAL_MINIMUM    0x00 (0)
    0x25, 0x01, //   (GLOBAL) LOGICAL_MAXIMUM    0x01 (1)
    0x95, 0x08, //   (GLOBAL) REPORT_COUNT       0x08 (8) Number of fields
    0x75, 0x01, //   (GLOBAL) REPORT_SIZE        0x01 (1) Number of bits per field
    0x81, 0x02, //   (MAIN) INPUT 0x00000002 (8 fields x 1 bit) Data Variable Absolute
    0x05, 0x07, //   (GLOBAL) USAGE_PAGE         0x0007 Keyboard/Keypad Page
    0x19, 0x00, //   (LOCAL)  USAGE_MINIMUM      0x00070000 Keyboard No event indicated
    0x29, 0xFE, //   (LOCAL)  USAGE_MAXIMUM      0x000700FE
    0x15, 0x00, //   (GLOBAL) LOGICAL_MINIMUM    0x00 (0)
    0x25, 0x01, //   (GLOBAL) LOGICAL_MAXIMUM    0x01 (1)
    0x95, 0xFF, //   (GLOBAL) REPORT_COUNT       0xFF (255) Number of fields
    0x75, 0x01, //   (GLOBAL) REPORT_SIZE        0x01 (1) Number of bits per field
    0x81, 0x02, //   (MAIN) INPUT 0x00000002 (255 fields x 1 bit) Data Variable Absolute
    0x05, 0x08, //   (GLOBAL) USAGE_PAGE         0x0008 LED Page
    0x19, 0x01, //   (LOCAL)  USAGE_MINIMUM      0x00080001 Num Lock
    0x29, 0x05, //   (LOCAL)  USAGE_MAXIMUM      0x00080005 Kana
    0x95, 0x05, //   (GLOBAL) REPORT_COUNT       0x05 (5) Number of fields
    0x75, 0x01, //   (GLOBAL) REPORT_SIZE        0x01 (1) Number of bits per field
    0x91, 0x02, //   (MAIN) OUTPUT 0x00000002 (5 fields x 1 bit) Data Variable Absolute
    0x95, 0x01, //   (GLOBAL) REPORT_COUNT       0x01 (1) Number of fields
    0x75, 0x03, //   (GLOBAL) REPORT_SIZE        0x03 (3) Number of bits per field
    0x91, 0x01, //   (MAIN) OUTPUT 0x00000001 (1 field x 3 bits) Constant
    0xC0,       // (MAIN)   END_COLLECTION     Application
];

pub struct HidWriter<'d, D: Driver<'d>, const N: usize> {
    ep_in: D::EndpointIn,
}

impl<'d, D: Driver<'d>, const N: usize> HidWriter<'d, D, N> {
    pub fn new(ep_in: <D>::EndpointIn) -> Self {
        Self { ep_in }
    }

    /// Writes `report` to its interrupt endpoint.
    pub async fn write(&mut self, report: &[u8]) -> Result<(), EndpointError> {
        assert!(report.len() <= N);

        let max_packet_size = usize::from(self.ep_in.info().max_packet_size);
        let zlp_needed = report.len() < N && report.len().is_multiple_of(max_packet_size);
        for chunk in report.chunks(max_packet_size) {
            self.ep_in.write(chunk).await?;
        }

        if zlp_needed {
            self.ep_in.write(&[]).await?;
        }

        Ok(())
    }
}

/// Internal state for the keyboard HID interface.
pub struct State {
    control: MaybeUninit<Control>,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    pub const fn new() -> Self {
        State {
            control: MaybeUninit::uninit(),
        }
    }
}

const CONFIG_SIZE: usize = 128;
const BOS_SIZE: usize = 32;
const MSOS_SIZE: usize = 0;
const CONTROL_SIZE: usize = 64;

pub struct UsbBuffers {
    config_descriptor_buf: [u8; CONFIG_SIZE],
    bos_descriptor_buf: [u8; BOS_SIZE],
    msos_descriptor_buf: [u8; MSOS_SIZE],
    control_buf: [u8; CONTROL_SIZE],
}

impl Default for UsbBuffers {
    fn default() -> Self {
        Self {
            config_descriptor_buf: [0; CONFIG_SIZE],
            bos_descriptor_buf: [0; BOS_SIZE],
            msos_descriptor_buf: [0; MSOS_SIZE],
            control_buf: [0; CONTROL_SIZE],
        }
    }
}

pub struct Configurator<'d> {
    device_config: Option<Config<'d>>,
    max_packet_size: u16,
    poll_ms: u8,
}

impl<'d> Configurator<'d> {
    pub fn new(device_config: Config<'d>) -> Self {
        Self {
            device_config: Some(device_config),
            max_packet_size: device_config.max_packet_size_0 as u16,
            poll_ms: 1,
        }
    }

    pub fn usb_builder<D: Driver<'d>>(
        &mut self,
        driver: D,
        buffers: &'d mut UsbBuffers,
    ) -> Option<Builder<'d, D>> {
        self.device_config.take().map(|device_config| {
            Builder::new(
                driver,
                device_config,
                &mut buffers.config_descriptor_buf,
                &mut buffers.bos_descriptor_buf,
                &mut buffers.msos_descriptor_buf,
                &mut buffers.control_buf,
            )
        })
    }

    /// Add the keyboard interface and return the writer for its interrupt-in
    /// endpoint.
    pub fn add_keyboard_iface<D: Driver<'d>>(
        &'d self,
        builder: &mut Builder<'d, D>,
        state: &'d mut State,
    ) -> HidWriter<'d, D, REPORT_SIZE> {
        let descriptor: &'static [u8] = &KEYBOARD_REPORT_DESC;
        let mut func = builder.function(3, 1, 1);
        let mut iface = func.interface();
        let if_num = iface.interface_number();
        let mut alt = iface.alt_setting(3, 1, 1, None);

        let len = descriptor.len();
        alt.descriptor(
            HID_DESC_DESCTYPE_HID,
            &[
                HID_DESC_SPEC_1_11[0],
                HID_DESC_SPEC_1_11[1],
                HID_DESC_COUNTRY_UNSPEC,
                1, // Number of following descriptors
                HID_DESC_DESCTYPE_HID_REPORT,
                (len & 0xFF) as u8,
                (len >> 8 & 0xFF) as u8,
            ],
        );

        let ep_in = alt.endpoint_interrupt_in(self.max_packet_size, self.poll_ms);

        drop(func);

        let control = state.control.write(Control::new(if_num, descriptor));
        builder.handler(control);

        HidWriter::new(ep_in)
    }
}

struct Control {
    if_num: InterfaceNumber,
    report_descriptor: &'static [u8],
    hid_descriptor: [u8; 9],
}

impl Control {
    fn new(if_num: InterfaceNumber, report_descriptor: &'static [u8]) -> Self {
        Control {
            if_num,
            report_descriptor,
            hid_descriptor: [
                9, // Length of buf inclusive of size prefix
                HID_DESC_DESCTYPE_HID,
                HID_DESC_SPEC_1_11[0],
                HID_DESC_SPEC_1_11[1],
                HID_DESC_COUNTRY_UNSPEC,
                1, // Number of following descriptors
                HID_DESC_DESCTYPE_HID_REPORT,
                (report_descriptor.len() & 0xFF) as u8,
                (report_descriptor.len() >> 8 & 0xFF) as u8,
            ],
        }
    }
}

impl Handler for Control {
    fn control_out(&mut self, req: Request, _data: &[u8]) -> Option<OutResponse> {
        if (req.request_type, req.recipient, req.index)
            != (
                RequestType::Class,
                Recipient::Interface,
                self.if_num.0 as u16,
            )
        {
            return None;
        }

        match req.request {
            HID_REQ_SET_IDLE => Some(OutResponse::Accepted),
            HID_REQ_SET_PROTOCOL => {
                if req.value == 1 {
                    Some(OutResponse::Accepted)
                } else {
                    crate::warn!("HID Boot Protocol is unsupported.");
                    Some(OutResponse::Rejected)
                }
            }
            _ => Some(OutResponse::Rejected),
        }
    }

    fn control_in<'a>(&'a mut self, req: Request, buf: &'a mut [u8]) -> Option<InResponse<'a>> {
        if req.index != self.if_num.0 as u16 {
            return None;
        }

        match (req.request_type, req.recipient) {
            (RequestType::Standard, Recipient::Interface) => match req.request {
                Request::GET_DESCRIPTOR => match (req.value >> 8) as u8 {
                    HID_DESC_DESCTYPE_HID_REPORT => {
                        Some(InResponse::Accepted(self.report_descriptor))
                    }
                    HID_DESC_DESCTYPE_HID => Some(InResponse::Accepted(&self.hid_descriptor)),
                    _ => Some(InResponse::Rejected),
                },
                _ => Some(InResponse::Rejected),
            },
            (RequestType::Class, Recipient::Interface) => match req.request {
                HID_REQ_GET_PROTOCOL => {
                    buf[0] = 1;
                    Some(InResponse::Accepted(&buf[0..1]))
                }
                _ => Some(InResponse::Rejected),
            },
            _ => None,
        }
    }
}

/// Forward finished report images from the mapper to the host.
pub async fn hid_task<'d, D, M, const N: usize>(
    mut writer: HidWriter<'d, D, REPORT_SIZE>,
    channel: &HidChannel<M, N>,
) where
    D: Driver<'d>,
    M: RawMutex,
{
    loop {
        let report = channel.receive().await;
        if let Err(e) = writer.write(&report).await {
            crate::warn!("Failed to send report: {:?}", e);
        }
    }
}
