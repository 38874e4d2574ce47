// ==========================================
// Fieldwork costing - canonical cost descriptions
// ==========================================
// Catalogue descriptions are parsed once into CostDescription;
// the quantity and price dispatchers match on the enum.
// Anything unrecognised is Unmatched and takes the category
// fallback.
// ==========================================

use crate::domain::types::{SampleType, TravelRole};
use std::fmt;

// ==========================================
// Category (root segment of a hierarchy path)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostCategory {
    Interviewer,
    SupervisorAssistant,
    Qc,
    Dp,
    Incentive,
    Communication,
    Stationery,
    Other,
    Travel,
    Uncategorised,
}

impl CostCategory {
    pub fn from_segment(segment: &str) -> Self {
        match segment.trim() {
            "INTERVIEWER" => CostCategory::Interviewer,
            "SUPERVISOR/ ASSISTANT" | "SUPERVISOR/ASSISTANT" | "SUPERVISOR / ASSISTANT" => {
                CostCategory::SupervisorAssistant
            }
            "QC" => CostCategory::Qc,
            "DP" => CostCategory::Dp,
            "INCENTIVE" => CostCategory::Incentive,
            "COMMUNICATION" => CostCategory::Communication,
            "STATIONERY" => CostCategory::Stationery,
            "OTHER" => CostCategory::Other,
            "TRAVEL" => CostCategory::Travel,
            _ => CostCategory::Uncategorised,
        }
    }
}

// ==========================================
// CostDescription
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostDescription {
    // device rental
    TabletUnder9,
    TabletAtLeast9,
    Laptop,
    // field logistics
    ParkingFee,
    FailureRate,
    RecruitIdi,
    // supervisor / assistant
    SupervisorOnField,
    SupervisorRecruit,
    SupervisorDesk,
    AssistantSetup,
    AssistantOnField,
    SupervisorIdi,
    // qc
    QcOnField,
    QcInHome,
    QcInLocation,
    QcIdi,
    // dp
    DpCoding,
    DpInput,
    DpCleanData,
    // incentive
    Incentive(SampleType),
    // communication
    Landline,
    PhoneCard,
    // stationery
    BlackWhitePhoto,
    ShowPhoto,
    ShowCard,
    DropCard,
    ColorPrint,
    Decal,
    Lamination,
    FormPackage,
    Binding,
    // other
    Transport,
    LocationRental,
    FridgeRental,
    TvRental,
    PartitionRental,
    SetupLocation,
    Drink,
    Tissue,
    Snack,
    // travel
    TravelAllowance,
    Accommodation,
    TravelTransport,
    DistantAllowance(TravelRole),
    NearbyAllowance(TravelRole),
    /// Description with no dedicated formula
    Unmatched,
}

const INCENTIVE_PREFIX: &str = "Quà Phiếu PV - ";
const DISTANT_PREFIX: &str = "Phụ cấp công tác xa - ";
const NEARBY_PREFIX: &str = "Phụ cấp công tác gần - ";

const FIXED: &[(&str, CostDescription)] = &[
    ("Thuê tablet < 9 inch", CostDescription::TabletUnder9),
    ("Thuê tablet >= 9 inch", CostDescription::TabletAtLeast9),
    ("Thuê laptop", CostDescription::Laptop),
    ("Phí gửi xe", CostDescription::ParkingFee),
    ("Chi phí failure rate", CostDescription::FailureRate),
    ("Recruit IDI", CostDescription::RecruitIdi),
    ("Chi phí Quản lý - On-field", CostDescription::SupervisorOnField),
    ("Chi phí Quản lý recruit - On-field", CostDescription::SupervisorRecruit),
    ("Chi phí Quản lý ngồi bàn - On-field", CostDescription::SupervisorDesk),
    ("Chi phí Assistant - Set up", CostDescription::AssistantSetup),
    ("Chi phí Assistant - On-field", CostDescription::AssistantOnField),
    ("Chi phí Quản lý IDI", CostDescription::SupervisorIdi),
    ("Chi phí QC - On-field", CostDescription::QcOnField),
    ("Chi phí QC - In home", CostDescription::QcInHome),
    ("Chi phí QC - In Location", CostDescription::QcInLocation),
    ("Chi phí QC - IDI", CostDescription::QcIdi),
    ("Chi phí Coding", CostDescription::DpCoding),
    ("Chi phí Nhập liệu", CostDescription::DpInput),
    ("Chi phí hỗ trợ clean data", CostDescription::DpCleanData),
    ("Điện thoại bàn", CostDescription::Landline),
    ("Thẻ điện thoại", CostDescription::PhoneCard),
    ("Photo trắng đen", CostDescription::BlackWhitePhoto),
    ("Showphoto", CostDescription::ShowPhoto),
    ("Showcard", CostDescription::ShowCard),
    ("Dropcard", CostDescription::DropCard),
    ("In màu / Concept", CostDescription::ColorPrint),
    ("Decal", CostDescription::Decal),
    ("Ép plastic", CostDescription::Lamination),
    ("Biểu mẫu", CostDescription::FormPackage),
    ("Đóng cuốn", CostDescription::Binding),
    ("Chi phí vận chuyển", CostDescription::Transport),
    ("Thuê địa điểm", CostDescription::LocationRental),
    ("Thuê tủ lạnh", CostDescription::FridgeRental),
    ("Thuê TV", CostDescription::TvRental),
    ("Thuê vách ngăn", CostDescription::PartitionRental),
    ("Set up địa điểm", CostDescription::SetupLocation),
    ("Nước uống", CostDescription::Drink),
    ("Khăn giấy", CostDescription::Tissue),
    ("Snack", CostDescription::Snack),
    ("Công tác phí", CostDescription::TravelAllowance),
    ("Chi phí lưu trú", CostDescription::Accommodation),
    ("Chi phí di chuyển", CostDescription::TravelTransport),
];

fn travel_role(label: &str) -> Option<TravelRole> {
    match label {
        "Supervisor" => Some(TravelRole::Supervisor),
        "Interviewer" => Some(TravelRole::Interviewer),
        "QC" => Some(TravelRole::Qc),
        _ => None,
    }
}

impl CostDescription {
    /// Exact, case-sensitive parse of a catalogue description
    pub fn parse(description: &str) -> Self {
        if let Some((_, d)) = FIXED.iter().find(|(label, _)| *label == description) {
            return *d;
        }
        if let Some(rest) = description.strip_prefix(INCENTIVE_PREFIX) {
            if let Some(t) = SampleType::ALL.iter().find(|t| t.as_str() == rest) {
                return CostDescription::Incentive(*t);
            }
        }
        if let Some(role) = description.strip_prefix(DISTANT_PREFIX).and_then(travel_role) {
            return CostDescription::DistantAllowance(role);
        }
        if let Some(role) = description.strip_prefix(NEARBY_PREFIX).and_then(travel_role) {
            return CostDescription::NearbyAllowance(role);
        }
        CostDescription::Unmatched
    }

    pub fn is_device_rental(&self) -> bool {
        matches!(
            self,
            CostDescription::TabletUnder9 | CostDescription::TabletAtLeast9 | CostDescription::Laptop
        )
    }

    pub fn is_stationery(&self) -> bool {
        matches!(
            self,
            CostDescription::BlackWhitePhoto
                | CostDescription::ShowPhoto
                | CostDescription::ShowCard
                | CostDescription::DropCard
                | CostDescription::ColorPrint
                | CostDescription::Decal
                | CostDescription::Lamination
                | CostDescription::FormPackage
                | CostDescription::Binding
        )
    }

    pub fn is_travel(&self) -> bool {
        matches!(
            self,
            CostDescription::TravelAllowance
                | CostDescription::Accommodation
                | CostDescription::TravelTransport
                | CostDescription::DistantAllowance(_)
                | CostDescription::NearbyAllowance(_)
        )
    }

    /// Canonical catalogue label
    pub fn label(&self) -> String {
        match self {
            CostDescription::Incentive(t) => format!("{}{}", INCENTIVE_PREFIX, t.as_str()),
            CostDescription::DistantAllowance(r) => format!("{}{}", DISTANT_PREFIX, r.line_label()),
            CostDescription::NearbyAllowance(r) => format!("{}{}", NEARBY_PREFIX, r.line_label()),
            CostDescription::Unmatched => String::new(),
            other => FIXED
                .iter()
                .find(|(_, d)| d == other)
                .map(|(label, _)| label.to_string())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for CostDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
