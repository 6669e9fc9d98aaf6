// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Request builders: one per record type.
//!
//! Each builder maps the query selector onto a component mask and a match
//! template (the record image carrying the key fields). Unsupported
//! (selector, record type) pairs are rejected here, before any wire
//! traffic.

use super::{Query, RecordType, Selector};
use crate::wire::cursor::CursorMut;
use crate::wire::mad::{MadHeader, SaHeader, SA_HEADER_SIZE};
use crate::wire::mask::ComponentMask;
use crate::wire::records::*;
use crate::wire::WireResult;
use crate::{Error, Result};

/// Component mask plus the match-template payload for one request.
pub struct RequestBody {
    pub mask: ComponentMask,
    pub payload: Vec<u8>,
}

fn body<R: SaRecord>(mask: u64, template: &R) -> Result<RequestBody> {
    let payload = template.to_wire().map_err(Error::from)?;
    Ok(RequestBody {
        mask: ComponentMask(mask),
        payload,
    })
}

fn empty_body(size: usize) -> RequestBody {
    RequestBody {
        mask: ComponentMask::NONE,
        payload: vec![0u8; size],
    }
}

fn unsupported(query: &Query) -> Error {
    log::debug!(
        "[SA] unsupported query combination: {:?} for {:?}",
        query.selector,
        query.record_type
    );
    Error::InvalidParameter
}

/// Build the component mask and payload for a query.
///
/// This is the supported-combination registry: every arm is an allowed
/// (selector, record type) pair; everything else is `InvalidParameter`.
pub fn build_body(query: &Query) -> Result<RequestBody> {
    use RecordType as RT;
    use Selector as S;

    match (query.record_type, &query.selector) {
        // Single-attribute Gets take no match key.
        (RT::ClassPortInfo | RT::FabricInfoRecord | RT::QuarantinedNodeRecord, S::NoInput) => {
            Ok(empty_body(query.record_type.wire_size()))
        }
        (RT::SmInfoRecord, S::NoInput) => Ok(empty_body(SmInfoRecord::WIRE_SIZE)),

        // Node record and its projections share one builder.
        (
            RT::NodeRecord | RT::NodeDesc | RT::Lid | RT::SystemImageGuid | RT::PortGuid
            | RT::NodeGuid,
            selector,
        ) => {
            let mut rec = NodeRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    node::COMP_LID
                }
                S::PortGuid(guid) => {
                    rec.node_info.port_guid = *guid;
                    node::COMP_PORTGUID
                }
                S::NodeGuid(guid) => {
                    rec.node_info.node_guid = *guid;
                    node::COMP_NODEGUID
                }
                S::SystemImageGuid(guid) => {
                    rec.node_info.system_image_guid = *guid;
                    node::COMP_SYSIMAGEGUID
                }
                S::NodeType(ty) => {
                    rec.node_info.node_type = *ty;
                    node::COMP_NODETYPE
                }
                S::NodeDesc(desc) => {
                    rec.node_desc = *desc;
                    node::COMP_NODEDESC
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::PortInfoRecord, selector) => {
            let mut rec = PortInfoRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.end_port_lid = *lid;
                    portinfo::COMP_ENDPORTLID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::SwitchInfoRecord, selector) => {
            let mut rec = SwitchInfoRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    switchinfo::COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::LinkRecord, selector) => {
            let mut rec = LinkRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.from_lid = *lid;
                    link::COMP_FROM_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::ServiceRecord, selector) => {
            let mut rec = ServiceRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::ServiceId(id) => {
                    rec.service_id = *id;
                    service::COMP_SERVICE_ID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::McMemberRecord, selector) => {
            let mut rec = McMemberRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::McGid(gid) => {
                    rec.mgid = *gid;
                    mcmember::COMP_MGID
                }
                S::Lid(mlid) => {
                    rec.mlid = *mlid;
                    mcmember::COMP_MLID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::InformInfoRecord, selector) => {
            let mut rec = InformInfoRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.subscriber_lid = *lid;
                    inform::COMP_SUBSCRIBER_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        // Path and trace queries carry a path-record template.
        (RT::PathRecord | RT::TraceRecord, S::PathEndpoints { sgid, dgid }) => {
            let rec = PathRecord {
                sgid: *sgid,
                dgid: *dgid,
                reversible: true,
                numb_path: path::DEFAULT_NUMB_PATH,
                ..PathRecord::default()
            };
            body(
                path::COMP_SGID | path::COMP_DGID | path::COMP_REVERSIBLE | path::COMP_NUMBPATH,
                &rec,
            )
        }

        (RT::ScScTableRecord, selector) => {
            let mut rec = ScMapRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    tables::SCSC_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::SlScTableRecord, selector) => {
            let mut rec = SlScTableRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    tables::SLSC_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::ScSlTableRecord, selector) => {
            let mut rec = ScSlTableRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    tables::SCSL_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::ScVltTableRecord | RT::ScVlntTableRecord, selector) => {
            let mut rec = ScVlTableRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    tables::SCVL_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::VlArbTableRecord, selector) => {
            let mut rec = VlArbTableRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    tables::VLARB_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::PKeyTableRecord, selector) => {
            let mut rec = PKeyTableRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    tables::PKEYTABLE_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::LinearFdbRecord, selector) => {
            let mut rec = LinearFdbRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    tables::LFT_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::McastFdbRecord, selector) => {
            let mut rec = McastFdbRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    tables::MFT_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::VfInfoRecord, selector) => {
            let mut rec = VfInfoRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Index(idx) => {
                    rec.vf_index = *idx;
                    misc::VFINFO_COMP_INDEX
                }
                S::PKey(pkey) => {
                    rec.pkey = *pkey;
                    misc::VFINFO_COMP_PKEY
                }
                S::ServiceId(id) => {
                    rec.service_id = *id;
                    misc::VFINFO_COMP_SERVICEID
                }
                S::McGid(gid) => {
                    rec.mgid = *gid;
                    misc::VFINFO_COMP_MGID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::CongestionInfoRecord, selector) => {
            let mut rec = CongestionInfoRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    congestion::CONG_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::SwitchCongRecord, selector) => {
            let mut rec = SwitchCongRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    congestion::SWCONG_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::SwitchPortCongRecord, selector) => {
            let mut rec = SwitchPortCongRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    congestion::SWPORTCONG_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::HfiCongRecord, selector) => {
            let mut rec = HfiCongRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    congestion::HFICONG_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::HfiCongCtrlRecord, selector) => {
            let mut rec = HfiCongCtrlRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    congestion::HFICONGCTRL_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::BufferControlTableRecord, selector) => {
            let mut rec = BufferControlTableRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    tables::BFCTRL_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::CableInfoRecord, selector) => {
            let mut rec = CableInfoRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    tables::CIR_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::PortGroupRecord, selector) => {
            let mut rec = PortGroupRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    tables::PGTB_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::PortGroupFwdRecord, selector) => {
            let mut rec = PortGroupFwdRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.lid = *lid;
                    tables::PGFDB_COMP_LID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        (RT::SwitchCostRecord, selector) => {
            let mut rec = SwitchCostRecord::default();
            let mask = match selector {
                S::NoInput => 0,
                S::Lid(lid) => {
                    rec.slid = *lid;
                    misc::SWITCH_COST_COMP_SLID
                }
                _ => return Err(unsupported(query)),
            };
            body(mask, &rec)
        }

        _ => Err(unsupported(query)),
    }
}

/// Assemble the full request MAD: headers plus match template.
pub fn build_request(query: &Query, tid: u64) -> Result<Vec<u8>> {
    let request_body = build_body(query)?;
    let header = MadHeader::sa_request(query.record_type.wire_method(), query.record_type.attr_id(), tid);
    let sa_header = SaHeader::for_request(request_body.mask);
    assemble(&header, &sa_header, &request_body.payload).map_err(Error::from)
}

pub(crate) fn assemble(
    header: &MadHeader,
    sa_header: &SaHeader,
    payload: &[u8],
) -> WireResult<Vec<u8>> {
    let mut buf = vec![0u8; SA_HEADER_SIZE + payload.len()];
    let mut c = CursorMut::new(&mut buf);
    header.encode(&mut c)?;
    sa_header.encode(&mut c)?;
    c.write_bytes(payload)?;
    Ok(buf)
}
