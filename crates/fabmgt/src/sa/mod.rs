// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 fabmgt contributors

//! Query marshaller/dispatcher for the Subnet Administration service.
//!
//! A [`Query`] pairs a match [`Selector`] with a requested [`RecordType`].
//! The builder registry validates the pair and produces the wire request;
//! the decoder turns the response back into typed [`WireRecord`]s.

pub mod build;
pub mod decode;
pub mod pa;
pub mod query;

pub use pa::{ImageId, ImageInfo, PaClient, PortCounters};
pub use query::SaClient;

use crate::wire::gid::Gid;
use crate::wire::mad::{method, MadStatus};
use crate::wire::records;
use crate::wire::records::node::NodeDescription;

/// The match key of a query: which field(s) select the records wanted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Match everything of the requested kind.
    NoInput,
    Lid(u32),
    PortGuid(u64),
    NodeGuid(u64),
    SystemImageGuid(u64),
    NodeType(u8),
    NodeDesc(NodeDescription),
    /// Source and destination GIDs of a path.
    PathEndpoints { sgid: Gid, dgid: Gid },
    ServiceId(u64),
    McGid(Gid),
    PKey(u16),
    Index(u16),
}

/// The record kind a query asks for.
///
/// Projection kinds (`NodeDesc`, `Lid`, the GUID kinds) share the node
/// record wire image and project a single field out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    ClassPortInfo,
    NodeRecord,
    NodeDesc,
    Lid,
    SystemImageGuid,
    PortGuid,
    NodeGuid,
    PortInfoRecord,
    SwitchInfoRecord,
    SmInfoRecord,
    LinkRecord,
    ServiceRecord,
    McMemberRecord,
    InformInfoRecord,
    TraceRecord,
    PathRecord,
    ScScTableRecord,
    SlScTableRecord,
    ScSlTableRecord,
    ScVltTableRecord,
    ScVlntTableRecord,
    VlArbTableRecord,
    PKeyTableRecord,
    LinearFdbRecord,
    McastFdbRecord,
    VfInfoRecord,
    FabricInfoRecord,
    QuarantinedNodeRecord,
    CongestionInfoRecord,
    SwitchCongRecord,
    SwitchPortCongRecord,
    HfiCongRecord,
    HfiCongCtrlRecord,
    BufferControlTableRecord,
    CableInfoRecord,
    PortGroupRecord,
    PortGroupFwdRecord,
    SwitchCostRecord,
}

impl RecordType {
    /// Administration attribute id carried in the MAD header.
    pub fn attr_id(self) -> u16 {
        use records::attr;
        match self {
            RecordType::ClassPortInfo => attr::CLASS_PORT_INFO,
            RecordType::NodeRecord
            | RecordType::NodeDesc
            | RecordType::Lid
            | RecordType::SystemImageGuid
            | RecordType::PortGuid
            | RecordType::NodeGuid => attr::NODE_RECORD,
            RecordType::PortInfoRecord => attr::PORTINFO_RECORD,
            RecordType::SwitchInfoRecord => attr::SWITCHINFO_RECORD,
            RecordType::SmInfoRecord => attr::SMINFO_RECORD,
            RecordType::LinkRecord => attr::LINK_RECORD,
            RecordType::ServiceRecord => attr::SERVICE_RECORD,
            RecordType::McMemberRecord => attr::MCMEMBER_RECORD,
            RecordType::InformInfoRecord => attr::INFORM_INFO_RECORD,
            RecordType::TraceRecord => attr::TRACE_RECORD,
            RecordType::PathRecord => attr::PATH_RECORD,
            RecordType::ScScTableRecord => attr::SC_MAPTBL_RECORD,
            RecordType::SlScTableRecord => attr::SL2SC_MAPTBL_RECORD,
            RecordType::ScSlTableRecord => attr::SC2SL_MAPTBL_RECORD,
            RecordType::ScVltTableRecord => attr::SC2VL_T_MAPTBL_RECORD,
            RecordType::ScVlntTableRecord => attr::SC2VL_NT_MAPTBL_RECORD,
            RecordType::VlArbTableRecord => attr::VLARBTABLE_RECORD,
            RecordType::PKeyTableRecord => attr::P_KEY_TABLE_RECORD,
            RecordType::LinearFdbRecord => attr::LINEAR_FWDTBL_RECORD,
            RecordType::McastFdbRecord => attr::MCAST_FWDTBL_RECORD,
            RecordType::VfInfoRecord => attr::VF_INFO_RECORD,
            RecordType::FabricInfoRecord => attr::FABRICINFO_RECORD,
            RecordType::QuarantinedNodeRecord => attr::QUARANTINED_NODE_RECORD,
            RecordType::CongestionInfoRecord => attr::CONGESTION_INFO_RECORD,
            RecordType::SwitchCongRecord => attr::SWITCH_CONG_RECORD,
            RecordType::SwitchPortCongRecord => attr::SWITCH_PORT_CONG_RECORD,
            RecordType::HfiCongRecord => attr::HFI_CONG_RECORD,
            RecordType::HfiCongCtrlRecord => attr::HFI_CONG_CTRL_RECORD,
            RecordType::BufferControlTableRecord => attr::BUFF_CTRL_TAB_RECORD,
            RecordType::CableInfoRecord => attr::CABLE_INFO_RECORD,
            RecordType::PortGroupRecord => attr::PORTGROUP_TABLE_RECORD,
            RecordType::PortGroupFwdRecord => attr::PGROUP_FWDTBL_RECORD,
            RecordType::SwitchCostRecord => attr::SWITCH_COST_RECORD,
        }
    }

    /// Method used to fetch this record kind.
    pub fn wire_method(self) -> u8 {
        match self {
            // Single fixed-size attributes use a plain Get.
            RecordType::ClassPortInfo | RecordType::FabricInfoRecord => method::GET,
            // Trace tables have their own method.
            RecordType::TraceRecord => method::GETTRACETABLE,
            _ => method::GETTABLE,
        }
    }

    /// Unpadded wire size of one record of this kind.
    pub fn wire_size(self) -> usize {
        use crate::wire::records::*;
        match self {
            RecordType::ClassPortInfo => ClassPortInfo::WIRE_SIZE,
            RecordType::NodeRecord
            | RecordType::NodeDesc
            | RecordType::Lid
            | RecordType::SystemImageGuid
            | RecordType::PortGuid
            | RecordType::NodeGuid => NodeRecord::WIRE_SIZE,
            RecordType::PortInfoRecord => PortInfoRecord::WIRE_SIZE,
            RecordType::SwitchInfoRecord => SwitchInfoRecord::WIRE_SIZE,
            RecordType::SmInfoRecord => SmInfoRecord::WIRE_SIZE,
            RecordType::LinkRecord => LinkRecord::WIRE_SIZE,
            RecordType::ServiceRecord => ServiceRecord::WIRE_SIZE,
            RecordType::McMemberRecord => McMemberRecord::WIRE_SIZE,
            RecordType::InformInfoRecord => InformInfoRecord::WIRE_SIZE,
            RecordType::TraceRecord => TraceRecord::WIRE_SIZE,
            RecordType::PathRecord => PathRecord::WIRE_SIZE,
            RecordType::ScScTableRecord => ScMapRecord::WIRE_SIZE,
            RecordType::SlScTableRecord => SlScTableRecord::WIRE_SIZE,
            RecordType::ScSlTableRecord => ScSlTableRecord::WIRE_SIZE,
            RecordType::ScVltTableRecord | RecordType::ScVlntTableRecord => {
                ScVlTableRecord::WIRE_SIZE
            }
            RecordType::VlArbTableRecord => VlArbTableRecord::WIRE_SIZE,
            RecordType::PKeyTableRecord => PKeyTableRecord::WIRE_SIZE,
            RecordType::LinearFdbRecord => LinearFdbRecord::WIRE_SIZE,
            RecordType::McastFdbRecord => McastFdbRecord::WIRE_SIZE,
            RecordType::VfInfoRecord => VfInfoRecord::WIRE_SIZE,
            RecordType::FabricInfoRecord => FabricInfoRecord::WIRE_SIZE,
            RecordType::QuarantinedNodeRecord => QuarantinedNodeRecord::WIRE_SIZE,
            RecordType::CongestionInfoRecord => CongestionInfoRecord::WIRE_SIZE,
            RecordType::SwitchCongRecord => SwitchCongRecord::WIRE_SIZE,
            RecordType::SwitchPortCongRecord => SwitchPortCongRecord::WIRE_SIZE,
            RecordType::HfiCongRecord => HfiCongRecord::WIRE_SIZE,
            RecordType::HfiCongCtrlRecord => HfiCongCtrlRecord::WIRE_SIZE,
            RecordType::BufferControlTableRecord => BufferControlTableRecord::WIRE_SIZE,
            RecordType::CableInfoRecord => CableInfoRecord::WIRE_SIZE,
            RecordType::PortGroupRecord => PortGroupRecord::WIRE_SIZE,
            RecordType::PortGroupFwdRecord => PortGroupFwdRecord::WIRE_SIZE,
            RecordType::SwitchCostRecord => SwitchCostRecord::WIRE_SIZE,
        }
    }

    /// Whether this attribute is reachable with the limited-management
    /// partition key. Everything else needs full management.
    pub fn allows_limited_pkey(self) -> bool {
        matches!(
            self,
            RecordType::ClassPortInfo
                | RecordType::NodeRecord
                | RecordType::NodeDesc
                | RecordType::Lid
                | RecordType::SystemImageGuid
                | RecordType::PortGuid
                | RecordType::NodeGuid
                | RecordType::PathRecord
                | RecordType::InformInfoRecord
                | RecordType::ServiceRecord
                | RecordType::McMemberRecord
        )
    }
}

/// A query: which records, matched how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub selector: Selector,
    pub record_type: RecordType,
}

impl Query {
    pub fn new(selector: Selector, record_type: RecordType) -> Self {
        Self {
            selector,
            record_type,
        }
    }

    /// Everything of one kind.
    pub fn all(record_type: RecordType) -> Self {
        Self::new(Selector::NoInput, record_type)
    }
}

/// One decoded record of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum WireRecord {
    ClassPortInfo(records::ClassPortInfo),
    Node(records::NodeRecord),
    NodeDesc(NodeDescription),
    Lid(u32),
    SystemImageGuid(u64),
    PortGuid(u64),
    NodeGuid(u64),
    PortInfo(Box<records::PortInfoRecord>),
    SwitchInfo(records::SwitchInfoRecord),
    SmInfo(records::SmInfoRecord),
    Link(records::LinkRecord),
    Service(records::ServiceRecord),
    McMember(records::McMemberRecord),
    InformInfo(records::InformInfoRecord),
    Trace(records::TraceRecord),
    Path(records::PathRecord),
    ScScTable(records::ScMapRecord),
    SlScTable(records::SlScTableRecord),
    ScSlTable(records::ScSlTableRecord),
    ScVltTable(records::ScVlTableRecord),
    ScVlntTable(records::ScVlTableRecord),
    VlArbTable(records::VlArbTableRecord),
    PKeyTable(records::PKeyTableRecord),
    LinearFdb(records::LinearFdbRecord),
    McastFdb(records::McastFdbRecord),
    VfInfo(records::VfInfoRecord),
    FabricInfo(records::FabricInfoRecord),
    QuarantinedNode(records::QuarantinedNodeRecord),
    CongestionInfo(records::CongestionInfoRecord),
    SwitchCong(records::SwitchCongRecord),
    SwitchPortCong(records::SwitchPortCongRecord),
    HfiCong(records::HfiCongRecord),
    HfiCongCtrl(records::HfiCongCtrlRecord),
    BufferControlTable(records::BufferControlTableRecord),
    CableInfo(records::CableInfoRecord),
    PortGroup(records::PortGroupRecord),
    PortGroupFwd(records::PortGroupFwdRecord),
    SwitchCost(records::SwitchCostRecord),
}

/// Overall classification of a completed query.
///
/// Transport and protocol failures never get this far (they are `Err`);
/// this classifies responses that did arrive and decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    /// Success with at least one record.
    Ok,
    /// The service answered with a non-success status code.
    RemoteFailure(MadStatus),
    /// Success status but zero records matched.
    NoRecords,
}

/// The outcome of a query: remote status plus the decoded records.
///
/// A non-success remote status still carries a (possibly empty) result so
/// the caller can inspect `mad_status`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub mad_status: MadStatus,
    pub records: Vec<WireRecord>,
}

impl QueryResult {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn status(&self) -> CallStatus {
        if !self.mad_status.is_success() {
            CallStatus::RemoteFailure(self.mad_status)
        } else if self.records.is_empty() {
            CallStatus::NoRecords
        } else {
            CallStatus::Ok
        }
    }

    /// Collapse the classification into the error taxonomy, dropping the
    /// records. Convenience wrappers use this; callers who need the
    /// records inspect [`QueryResult::status`] instead.
    pub fn require_records(self) -> crate::Result<Vec<WireRecord>> {
        match self.status() {
            CallStatus::Ok => Ok(self.records),
            CallStatus::RemoteFailure(status) => Err(crate::Error::RemoteStatus(status.0)),
            CallStatus::NoRecords => Err(crate::Error::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::records::SaRecord;

    #[test]
    fn test_projection_kinds_share_node_attr() {
        for rt in [
            RecordType::NodeRecord,
            RecordType::NodeDesc,
            RecordType::Lid,
            RecordType::SystemImageGuid,
            RecordType::PortGuid,
            RecordType::NodeGuid,
        ] {
            assert_eq!(rt.attr_id(), records::attr::NODE_RECORD);
            assert_eq!(rt.wire_size(), records::NodeRecord::WIRE_SIZE);
        }
    }

    #[test]
    fn test_methods_per_kind() {
        assert_eq!(RecordType::ClassPortInfo.wire_method(), method::GET);
        assert_eq!(RecordType::FabricInfoRecord.wire_method(), method::GET);
        assert_eq!(RecordType::TraceRecord.wire_method(), method::GETTRACETABLE);
        assert_eq!(RecordType::NodeRecord.wire_method(), method::GETTABLE);
        assert_eq!(RecordType::PathRecord.wire_method(), method::GETTABLE);
    }

    #[test]
    fn test_limited_pkey_policy() {
        assert!(RecordType::NodeRecord.allows_limited_pkey());
        assert!(RecordType::PathRecord.allows_limited_pkey());
        assert!(RecordType::ClassPortInfo.allows_limited_pkey());
        assert!(!RecordType::SwitchInfoRecord.allows_limited_pkey());
        assert!(!RecordType::LinearFdbRecord.allows_limited_pkey());
        assert!(!RecordType::VfInfoRecord.allows_limited_pkey());
    }
}
