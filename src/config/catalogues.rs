// ==========================================
// Fieldwork costing - static catalogues (Config Store)
// ==========================================
// Immutable lists offered by the editor combos and the
// compiled-in defaults behind ConfigManager.
// ==========================================

use crate::domain::travel::{TravelCost, TravelCostTable};
use crate::domain::types::{ProjectType, SampleType, StaffLevel};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const PROJECT_TYPES: [ProjectType; 4] = ProjectType::ALL;

pub const SAMPLE_TYPES: [SampleType; 4] = SampleType::ALL;

pub const SAMPLING_METHODS: &[&str] = &[
    "Random Sampling",
    "Quota Sampling",
    "Convenience Sampling",
    "Snowball Sampling",
    "Purposive Sampling",
    "Door-to-door",
    "Street intercept",
    "Database recruitment",
];

/// Quota regime that requires a quota description
pub const INTERLOCKED_QUOTA: &str = "Interlocked Quota";

pub const QUOTA_TYPES: &[&str] = &[
    "Non-Interlocked Quota",
    INTERLOCKED_QUOTA,
    "Soft Quota",
    "No Quota",
];

pub const RESP_CLASSIFICATIONS: &[&str] = &["B2C", "B2B", "HCP", "Expert"];

pub const COMPLEXITY_LEVELS: &[&str] = &["Basic", "Standard", "Complex"];

/// Standard interview duration bands (catalogue cost columns)
pub const DURATION_BANDS: &[&str] = &["< 15 phút", "15-30 phút", "30-45 phút", "45-60 phút"];

/// Tablet usage band priced at the short-rental rate
pub const SHORT_TABLET_USAGE: &str = "<= 15 phút";

pub const TABLET_USAGE_DURATIONS: &[&str] = &[SHORT_TABLET_USAGE, "> 15 phút"];

pub const INDUSTRIES: &[&str] = &[
    "Dairy",
    "Beverage",
    "Beer",
    "Food",
    "Personal Care",
    "Home Care",
    "Pharmaceutical",
    "Healthcare",
    "Automotive",
    "Banking & Finance",
    "Telecommunication",
    "Technology",
    "Tobacco",
    "Retail",
    "Other",
];

pub const VIETNAM_PROVINCES: &[&str] = &[
    "Hà Nội",
    "Hồ Chí Minh",
    "Hải Phòng",
    "Đà Nẵng",
    "Cần Thơ",
    "An Giang",
    "Bà Rịa - Vũng Tàu",
    "Bắc Giang",
    "Bắc Kạn",
    "Bạc Liêu",
    "Bắc Ninh",
    "Bến Tre",
    "Bình Định",
    "Bình Dương",
    "Bình Phước",
    "Bình Thuận",
    "Cà Mau",
    "Cao Bằng",
    "Đắk Lắk",
    "Đắk Nông",
    "Điện Biên",
    "Đồng Nai",
    "Đồng Tháp",
    "Gia Lai",
    "Hà Giang",
    "Hà Nam",
    "Hà Tĩnh",
    "Hải Dương",
    "Hậu Giang",
    "Hòa Bình",
    "Hưng Yên",
    "Khánh Hòa",
    "Kiên Giang",
    "Kon Tum",
    "Lai Châu",
    "Lâm Đồng",
    "Lạng Sơn",
    "Lào Cai",
    "Long An",
    "Nam Định",
    "Nghệ An",
    "Ninh Bình",
    "Ninh Thuận",
    "Phú Thọ",
    "Phú Yên",
    "Quảng Bình",
    "Quảng Nam",
    "Quảng Ngãi",
    "Quảng Ninh",
    "Quảng Trị",
    "Sóc Trăng",
    "Sơn La",
    "Tây Ninh",
    "Thái Bình",
    "Thái Nguyên",
    "Thanh Hóa",
    "Thừa Thiên Huế",
    "Tiền Giang",
    "Trà Vinh",
    "Tuyên Quang",
    "Vĩnh Long",
    "Vĩnh Phúc",
    "Yên Bái",
];

pub fn is_known_province(name: &str) -> bool {
    VIETNAM_PROVINCES.contains(&name.trim())
}

/// Default target audience offered for a fresh project
pub const DEFAULT_TARGET_AUDIENCE: &str = "Male/Female 18-65";

pub const DEFAULT_PARKING_FEE: Decimal = dec!(5000);

/// Compiled-in travel cost per staff level
pub fn default_travel_costs() -> TravelCostTable {
    [
        (StaffLevel::Junior, dec!(150000), dec!(400000), dec!(2000000)),
        (StaffLevel::Senior, dec!(200000), dec!(500000), dec!(2500000)),
        (StaffLevel::Manager, dec!(250000), dec!(700000), dec!(3000000)),
        (StaffLevel::Director, dec!(300000), dec!(1000000), dec!(3500000)),
    ]
    .into_iter()
    .map(|(level, allowance, accommodation, flight)| {
        (
            level,
            TravelCost {
                allowance_per_day: allowance,
                accommodation_per_night: accommodation,
                flight_ticket: flight,
            },
        )
    })
    .collect()
}
