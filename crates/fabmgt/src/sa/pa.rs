// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Performance Administration sub-client.
//!
//! PA queries ride the same MAD machinery with the performance management
//! class and a vendor OUI in the class header. The PA service keeps its own
//! reachability cache; convenience wrappers (sweep-image freeze/release/
//! renew, image info, port counters) are typed calls through one common
//! exchange.

use crate::port::{PortContext, ServiceState};
use crate::transport::MadTransport;
use crate::wire::cursor::{Cursor, CursorMut};
use crate::wire::mad::{method, MadHeader, SaHeader, PKEY_FULL_MGMT, SA_HEADER_SIZE};
use crate::wire::{WireError, WireResult};
use crate::{Error, Result};
use std::sync::Arc;

/// PA attribute identifiers.
pub mod pa_attr {
    pub const CLASS_PORT_INFO: u16 = 0x01;
    pub const GET_PORT_CTRS: u16 = 0xA3;
    pub const CLR_PORT_CTRS: u16 = 0xA4;
    pub const FREEZE_IMAGE: u16 = 0xA7;
    pub const RELEASE_IMAGE: u16 = 0xA8;
    pub const RENEW_IMAGE: u16 = 0xA9;
    pub const GET_IMAGE_INFO: u16 = 0xAB;
    pub const MOVE_FREEZE_FRAME: u16 = 0xAC;
}

/// PA class-specific status codes.
pub mod pa_status {
    pub const UNAVAILABLE: u16 = 0x0A00;
    pub const NO_GROUP: u16 = 0x0B00;
    pub const NO_PORT: u16 = 0x0C00;
    pub const INVALID_PARAMETER: u16 = 0x0E00;
    pub const NO_IMAGE: u16 = 0x0F00;
}

/// Vendor OUI carried in the class header of PA MADs. It occupies the
/// second through fourth bytes of the access-key field on the wire.
pub const PA_VENDOR_OUI: u32 = 0x00_066A;

/// Image number selecting the live (most recent) sweep.
pub const IMAGE_CURRENT: u64 = 0;
/// Image number addressing an image by absolute time.
pub const IMAGE_TIMED: u64 = u64::MAX;

/// Identifies one performance sweep image, 16 bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageId {
    pub image_number: u64,
    pub image_offset: i32,
    /// Absolute seconds or a relative offset, by image number convention.
    pub image_time: u32,
}

impl ImageId {
    pub const WIRE_SIZE: usize = 16;

    /// The live sweep image.
    pub fn current() -> Self {
        Self {
            image_number: IMAGE_CURRENT,
            image_offset: 0,
            image_time: 0,
        }
    }

    fn encode(&self, c: &mut CursorMut<'_>) -> WireResult<()> {
        c.write_u64_be(self.image_number)?;
        c.write_i32_be(self.image_offset)?;
        c.write_u32_be(self.image_time)
    }

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        Ok(Self {
            image_number: c.read_u64_be()?,
            image_offset: c.read_i32_be()?,
            image_time: c.read_u32_be()?,
        })
    }
}

/// Subnet-manager summary inside an image info response, 80 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSmInfo {
    pub lid: u32,
    pub priority: u8,
    pub state: u8,
    pub port_number: u8,
    pub sm_port_guid: u64,
    pub sm_node_desc: [u8; 64],
}

impl Default for ImageSmInfo {
    fn default() -> Self {
        Self {
            lid: 0,
            priority: 0,
            state: 0,
            port_number: 0,
            sm_port_guid: 0,
            sm_node_desc: [0; 64],
        }
    }
}

/// One sweep image's census, 232 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageInfo {
    pub image_id: ImageId,
    pub sweep_start: u64,
    pub sweep_duration: u32,
    pub num_hfi_ports: u16,
    pub num_switch_nodes: u16,
    pub num_switch_ports: u32,
    pub num_links: u32,
    pub num_sms: u32,
    pub num_no_resp_nodes: u32,
    pub num_no_resp_ports: u32,
    pub num_skipped_nodes: u32,
    pub num_skipped_ports: u32,
    pub num_unexpected_clear_ports: u32,
    pub image_interval: u32,
    pub sm_info: [ImageSmInfo; 2],
}

impl ImageInfo {
    pub const WIRE_SIZE: usize = 232;

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let image_id = ImageId::decode(c)?;
        let sweep_start = c.read_u64_be()?;
        let sweep_duration = c.read_u32_be()?;
        let num_hfi_ports = c.read_u16_be()?;
        c.skip(4)?;
        let num_switch_nodes = c.read_u16_be()?;
        let num_switch_ports = c.read_u32_be()?;
        let num_links = c.read_u32_be()?;
        let num_sms = c.read_u32_be()?;
        let num_no_resp_nodes = c.read_u32_be()?;
        let num_no_resp_ports = c.read_u32_be()?;
        let num_skipped_nodes = c.read_u32_be()?;
        let num_skipped_ports = c.read_u32_be()?;
        let num_unexpected_clear_ports = c.read_u32_be()?;
        let image_interval = c.read_u32_be()?;
        let mut sm_info = [ImageSmInfo::default(); 2];
        for sm in &mut sm_info {
            let lid = c.read_u32_be()?;
            let ps = c.read_u8()?;
            let port_number = c.read_u8()?;
            c.skip(2)?;
            let sm_port_guid = c.read_u64_be()?;
            let sm_node_desc = c.read_array()?;
            *sm = ImageSmInfo {
                lid,
                priority: ps >> 4,
                state: ps & 0xF,
                port_number,
                sm_port_guid,
                sm_node_desc,
            };
        }
        Ok(Self {
            image_id,
            sweep_start,
            sweep_duration,
            num_hfi_ports,
            num_switch_nodes,
            num_switch_ports,
            num_links,
            num_sms,
            num_no_resp_nodes,
            num_no_resp_ports,
            num_skipped_nodes,
            num_skipped_ports,
            num_unexpected_clear_ports,
            image_interval,
            sm_info,
        })
    }
}

/// Per-port counter snapshot, 256 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortCounters {
    pub node_lid: u32,
    pub port_number: u8,
    pub flags: u32,
    pub image_id: ImageId,
    pub port_xmit_data: u64,
    pub port_rcv_data: u64,
    pub port_xmit_pkts: u64,
    pub port_rcv_pkts: u64,
    pub port_multicast_xmit_pkts: u64,
    pub port_multicast_rcv_pkts: u64,
    pub local_link_integrity_errors: u64,
    pub fm_config_errors: u64,
    pub port_rcv_errors: u64,
    pub excessive_buffer_overruns: u64,
    pub port_rcv_constraint_errors: u64,
    pub port_rcv_switch_relay_errors: u64,
    pub port_xmit_discards: u64,
    pub port_xmit_constraint_errors: u64,
    pub port_rcv_remote_physical_errors: u64,
    pub sw_port_congestion: u64,
    pub port_xmit_wait: u64,
    pub port_rcv_fecn: u64,
    pub port_rcv_becn: u64,
    pub port_xmit_time_cong: u64,
    pub port_xmit_wasted_bw: u64,
    pub port_xmit_wait_data: u64,
    pub port_rcv_bubble: u64,
    pub port_mark_fecn: u64,
    pub link_error_recovery: u32,
    pub link_downed: u32,
    pub uncorrectable_errors: u8,
    /// Packed lanes_down(4)/reserved(1)/link_quality(3) byte.
    pub num_lanes_down: u8,
    pub link_quality_indicator: u8,
}

impl PortCounters {
    pub const WIRE_SIZE: usize = 248;

    fn decode(c: &mut Cursor<'_>) -> WireResult<Self> {
        let node_lid = c.read_u32_be()?;
        let port_number = c.read_u8()?;
        c.skip(3)?;
        let flags = c.read_u32_be()?;
        c.skip(12)?;
        let image_id = ImageId::decode(c)?;
        let mut counters = [0u64; 24];
        for v in &mut counters {
            *v = c.read_u64_be()?;
        }
        let link_error_recovery = c.read_u32_be()?;
        let link_downed = c.read_u32_be()?;
        let uncorrectable_errors = c.read_u8()?;
        let lq = c.read_u8()?;
        c.skip(6)?;
        Ok(Self {
            node_lid,
            port_number,
            flags,
            image_id,
            port_xmit_data: counters[0],
            port_rcv_data: counters[1],
            port_xmit_pkts: counters[2],
            port_rcv_pkts: counters[3],
            port_multicast_xmit_pkts: counters[4],
            port_multicast_rcv_pkts: counters[5],
            local_link_integrity_errors: counters[6],
            fm_config_errors: counters[7],
            port_rcv_errors: counters[8],
            excessive_buffer_overruns: counters[9],
            port_rcv_constraint_errors: counters[10],
            port_rcv_switch_relay_errors: counters[11],
            port_xmit_discards: counters[12],
            port_xmit_constraint_errors: counters[13],
            port_rcv_remote_physical_errors: counters[14],
            sw_port_congestion: counters[15],
            port_xmit_wait: counters[16],
            port_rcv_fecn: counters[17],
            port_rcv_becn: counters[18],
            port_xmit_time_cong: counters[19],
            port_xmit_wasted_bw: counters[20],
            port_xmit_wait_data: counters[21],
            port_rcv_bubble: counters[22],
            port_mark_fecn: counters[23],
            link_error_recovery,
            link_downed,
            uncorrectable_errors,
            num_lanes_down: lq >> 4,
            link_quality_indicator: lq & 0x7,
        })
    }
}

pub struct PaClient<T: MadTransport> {
    transport: Arc<T>,
    port: Arc<PortContext>,
}

impl<T: MadTransport> PaClient<T> {
    pub fn new(transport: Arc<T>, port: Arc<PortContext>) -> Self {
        Self { transport, port }
    }

    /// Freeze a sweep image so later queries can reference it.
    pub fn freeze_image(&self, image_id: ImageId) -> Result<ImageId> {
        let payload = self.exchange(
            method::SET,
            pa_attr::FREEZE_IMAGE,
            &encode_image_id(image_id)?,
        )?;
        decode_image_id(&payload)
    }

    /// Release a frozen image.
    pub fn release_image(&self, image_id: ImageId) -> Result<ImageId> {
        let payload = self.exchange(
            method::SET,
            pa_attr::RELEASE_IMAGE,
            &encode_image_id(image_id)?,
        )?;
        decode_image_id(&payload)
    }

    /// Renew the lease on a frozen image.
    pub fn renew_image(&self, image_id: ImageId) -> Result<ImageId> {
        let payload = self.exchange(
            method::SET,
            pa_attr::RENEW_IMAGE,
            &encode_image_id(image_id)?,
        )?;
        decode_image_id(&payload)
    }

    /// Move a freeze frame from one image to another.
    pub fn move_freeze_frame(&self, old: ImageId, new: ImageId) -> Result<(ImageId, ImageId)> {
        let mut request = vec![0u8; ImageId::WIRE_SIZE * 2];
        {
            let mut c = CursorMut::new(&mut request);
            old.encode(&mut c).map_err(Error::from)?;
            new.encode(&mut c).map_err(Error::from)?;
        }
        let payload = self.exchange(method::SET, pa_attr::MOVE_FREEZE_FRAME, &request)?;
        if payload.len() < ImageId::WIRE_SIZE * 2 {
            return Err(Error::InvalidProtocol);
        }
        let mut c = Cursor::new(&payload);
        let old = ImageId::decode(&mut c).map_err(Error::from)?;
        let new = ImageId::decode(&mut c).map_err(Error::from)?;
        Ok((old, new))
    }

    /// Fetch the census of one sweep image.
    pub fn image_info(&self, image_id: ImageId) -> Result<ImageInfo> {
        let mut request = vec![0u8; ImageInfo::WIRE_SIZE];
        {
            let mut c = CursorMut::new(&mut request);
            image_id.encode(&mut c).map_err(Error::from)?;
        }
        let payload = self.exchange(method::GETTABLE, pa_attr::GET_IMAGE_INFO, &request)?;
        if payload.len() < ImageInfo::WIRE_SIZE {
            return Err(Error::InvalidProtocol);
        }
        ImageInfo::decode(&mut Cursor::new(&payload)).map_err(Error::from)
    }

    /// Fetch the counters of one port in one image.
    pub fn port_counters(
        &self,
        node_lid: u32,
        port_number: u8,
        flags: u32,
        image_id: ImageId,
    ) -> Result<PortCounters> {
        let mut request = vec![0u8; PortCounters::WIRE_SIZE];
        {
            let mut c = CursorMut::new(&mut request);
            c.write_u32_be(node_lid).map_err(Error::from)?;
            c.write_u8(port_number).map_err(Error::from)?;
            c.write_zeros(3).map_err(Error::from)?;
            c.write_u32_be(flags).map_err(Error::from)?;
            c.write_zeros(12).map_err(Error::from)?;
            image_id.encode(&mut c).map_err(Error::from)?;
        }
        let payload = self.exchange(method::GET, pa_attr::GET_PORT_CTRS, &request)?;
        if payload.len() < PortCounters::WIRE_SIZE {
            return Err(Error::InvalidProtocol);
        }
        PortCounters::decode(&mut Cursor::new(&payload)).map_err(Error::from)
    }

    /// Clear selected counters of one port.
    pub fn clear_port_counters(
        &self,
        node_lid: u32,
        port_number: u8,
        counter_select_mask: u32,
    ) -> Result<()> {
        let mut request = vec![0u8; 12];
        {
            let mut c = CursorMut::new(&mut request);
            c.write_u32_be(node_lid).map_err(Error::from)?;
            c.write_u8(port_number).map_err(Error::from)?;
            c.write_zeros(3).map_err(Error::from)?;
            c.write_u32_be(counter_select_mask).map_err(Error::from)?;
        }
        self.exchange(method::SET, pa_attr::CLR_PORT_CTRS, &request)?;
        Ok(())
    }

    /// One PA request/response cycle; returns the class payload.
    fn exchange(&self, wire_method: u8, attr_id: u16, payload: &[u8]) -> Result<Vec<u8>> {
        let address = self.transport.address_info();
        if !address.has_pkey(PKEY_FULL_MGMT) {
            log::debug!("[PA] query requires the full management pkey");
            return Err(Error::Protection);
        }

        if self.port.pa_state()? != ServiceState::Operational {
            self.connect()?;
        }

        let result = self.exchange_raw(wire_method, attr_id, payload, false);
        if result.is_err() {
            self.port.lock()?.pa_state = ServiceState::Down;
        }
        result
    }

    /// Probe PA reachability with a short class-port-info exchange.
    fn connect(&self) -> Result<()> {
        match self.exchange_raw(method::GET, pa_attr::CLASS_PORT_INFO, &[0u8; 80], true) {
            Ok(_) => {
                self.port.lock()?.pa_state = ServiceState::Operational;
                Ok(())
            }
            Err(err) => {
                log::warn!("[PA] service connect failed: {}; marking PA down", err);
                self.port.lock()?.pa_state = ServiceState::Down;
                Err(Error::Unavailable)
            }
        }
    }

    fn exchange_raw(
        &self,
        wire_method: u8,
        attr_id: u16,
        payload: &[u8],
        probe: bool,
    ) -> Result<Vec<u8>> {
        let tid = self.port.next_tid();
        let header = MadHeader::pa_request(wire_method, attr_id, tid);
        let sa_header = SaHeader {
            // The vendor OUI rides the access-key field bytes.
            sm_key: u64::from(PA_VENDOR_OUI) << 32,
            ..SaHeader::default()
        };
        let request =
            crate::sa::build::assemble(&header, &sa_header, payload).map_err(Error::from)?;

        let config = &self.port.config;
        let timeout = if probe {
            config.probe_timeout
        } else {
            config.timeout
        };
        let response = self
            .transport
            .send_recv(&request, timeout, config.retry_count)?;
        if response.len() < SA_HEADER_SIZE {
            return Err(Error::from(WireError::Truncated {
                need: SA_HEADER_SIZE,
                have: response.len(),
            }));
        }

        let mut c = Cursor::new(&response);
        let rsp_header = MadHeader::decode(&mut c).map_err(Error::from)?;
        let _rsp_sa = SaHeader::decode(&mut c).map_err(Error::from)?;
        if rsp_header.tid != tid {
            log::debug!(
                "[PA] response tid {:#x} does not match request tid {:#x}",
                rsp_header.tid,
                tid
            );
            return Err(Error::InvalidProtocol);
        }
        if !rsp_header.status.is_success() {
            log::debug!("[PA] request failed with status {:#06x}", rsp_header.status.0);
            return Err(Error::RemoteStatus(rsp_header.status.0));
        }
        Ok(response[SA_HEADER_SIZE..].to_vec())
    }
}

fn encode_image_id(image_id: ImageId) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; ImageId::WIRE_SIZE];
    image_id
        .encode(&mut CursorMut::new(&mut buf))
        .map_err(Error::from)?;
    Ok(buf)
}

fn decode_image_id(payload: &[u8]) -> Result<ImageId> {
    if payload.len() < ImageId::WIRE_SIZE {
        return Err(Error::InvalidProtocol);
    }
    ImageId::decode(&mut Cursor::new(payload)).map_err(Error::from)
}
