use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{bounded_amount, min, non_negative};

/// The optional deduction items a plan can switch on.
///
/// Variant order is the display order used in breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionItemId {
    LifeInsurance,
    HealthInsurance,
    PensionInsurance,
    Pvd,
    Rmf,
    ThaiEsg,
    ThaiEsgx,
    HomeLoan,
    DonationDouble,
    DonationPolitical,
    EasyEReceipt,
}

impl DeductionItemId {
    pub const ALL: [DeductionItemId; 11] = [
        Self::LifeInsurance,
        Self::HealthInsurance,
        Self::PensionInsurance,
        Self::Pvd,
        Self::Rmf,
        Self::ThaiEsg,
        Self::ThaiEsgx,
        Self::HomeLoan,
        Self::DonationDouble,
        Self::DonationPolitical,
        Self::EasyEReceipt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LifeInsurance => "life_insurance",
            Self::HealthInsurance => "health_insurance",
            Self::PensionInsurance => "pension_insurance",
            Self::Pvd => "pvd",
            Self::Rmf => "rmf",
            Self::ThaiEsg => "thai_esg",
            Self::ThaiEsgx => "thai_esgx",
            Self::HomeLoan => "home_loan",
            Self::DonationDouble => "donation_double",
            Self::DonationPolitical => "donation_political",
            Self::EasyEReceipt => "easy_e_receipt",
        }
    }

    /// Accepts the snake_case identifier as well as the camelCase keys the
    /// browser version stored (`lifeInsurance`, `thaiEsgx`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "life_insurance" | "lifeInsurance" => Some(Self::LifeInsurance),
            "health_insurance" | "healthInsurance" => Some(Self::HealthInsurance),
            "pension_insurance" | "pensionInsurance" => Some(Self::PensionInsurance),
            "pvd" => Some(Self::Pvd),
            "rmf" => Some(Self::Rmf),
            "thai_esg" | "thaiEsg" => Some(Self::ThaiEsg),
            "thai_esgx" | "thaiEsgx" => Some(Self::ThaiEsgx),
            "home_loan" | "homeLoan" => Some(Self::HomeLoan),
            "donation_double" | "donationDouble" => Some(Self::DonationDouble),
            "donation_political" | "donationPolitical" => Some(Self::DonationPolitical),
            "easy_e_receipt" | "easyEreceipt" => Some(Self::EasyEReceipt),
            _ => None,
        }
    }

    /// Display label for breakdown tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LifeInsurance => "ประกันชีวิต",
            Self::HealthInsurance => "ประกันสุขภาพ",
            Self::PensionInsurance => "ประกันบำนาญ",
            Self::Pvd => "PVD",
            Self::Rmf => "RMF",
            Self::ThaiEsg => "Thai ESG",
            Self::ThaiEsgx => "Thai ESGx",
            Self::HomeLoan => "ดอกเบี้ยบ้าน",
            Self::DonationDouble => "บริจาค 2x",
            Self::DonationPolitical => "บริจาคพรรคการเมือง",
            Self::EasyEReceipt => "Easy E-Receipt",
        }
    }
}

impl fmt::Display for DeductionItemId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeductionItemId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown deduction item '{s}'"))
    }
}

/// A ceiling shared by several items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionGroup {
    /// Life + health insurance.
    Insurance,
    /// Pension insurance + provident fund + RMF.
    Retirement,
}

impl DeductionGroup {
    pub const ALL: [DeductionGroup; 2] = [Self::Insurance, Self::Retirement];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insurance => "insurance",
            Self::Retirement => "retirement",
        }
    }
}

/// How a group brings its members back under the shared cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReductionPolicy {
    /// Every member is scaled by `cap / sum`.
    Proportional,
    /// Members are cut one after another in the listed order, each by as much
    /// of the remaining excess as it can absorb.
    Ordered(Vec<DeductionItemId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub group: DeductionGroup,
    pub cap: Decimal,
    pub policy: ReductionPolicy,
}

/// Static description of one deduction item's limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionItemSpec {
    pub id: DeductionItemId,
    pub group: Option<DeductionGroup>,
    /// Absolute ceiling in baht.
    pub absolute_cap: Option<Decimal>,
    /// Ceiling as a fraction of net income (`0.30` = 30%).
    pub percent_of_net_cap: Option<Decimal>,
    /// Applied to the raw amount before capping (donations count double).
    pub multiplier: Decimal,
}

impl DeductionItemSpec {
    fn new(
        id: DeductionItemId,
        group: Option<DeductionGroup>,
        absolute_cap: Option<Decimal>,
        percent_of_net_cap: Option<Decimal>,
    ) -> Self {
        Self {
            id,
            group,
            absolute_cap,
            percent_of_net_cap,
            multiplier: Decimal::ONE,
        }
    }

    fn with_multiplier(
        mut self,
        multiplier: Decimal,
    ) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// The item's own ceiling at `net_income`, ignoring any group.
    /// `None` means the item has no individual limit.
    pub fn individual_cap(
        &self,
        net_income: Decimal,
    ) -> Option<Decimal> {
        let percent_cap = self
            .percent_of_net_cap
            .map(|pct| non_negative(net_income).saturating_mul(pct));
        match (self.absolute_cap, percent_cap) {
            (Some(a), Some(p)) => Some(min(a, p)),
            (Some(a), None) => Some(a),
            (None, Some(p)) => Some(p),
            (None, None) => None,
        }
    }

    /// Applies the multiplier and then the individual cap.
    pub fn clamp(
        &self,
        raw_amount: Decimal,
        net_income: Decimal,
    ) -> Decimal {
        let scaled = bounded_amount(raw_amount).saturating_mul(self.multiplier);
        match self.individual_cap(net_income) {
            Some(cap) => min(scaled, cap),
            None => scaled,
        }
    }
}

/// The full set of item and group rules used by the allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionCatalog {
    pub items: Vec<DeductionItemSpec>,
    pub groups: Vec<GroupSpec>,
}

impl DeductionCatalog {
    /// The eleven items offered by the planner, with the insurance group
    /// (100,000, proportional) and the retirement group (500,000, cut in the
    /// order RMF, PVD, pension insurance).
    pub fn standard() -> Self {
        use DeductionGroup::{Insurance, Retirement};
        use DeductionItemId::*;

        let items = vec![
            DeductionItemSpec::new(LifeInsurance, Some(Insurance), None, None),
            DeductionItemSpec::new(HealthInsurance, Some(Insurance), None, None),
            DeductionItemSpec::new(
                PensionInsurance,
                Some(Retirement),
                Some(dec!(200000)),
                Some(dec!(0.15)),
            ),
            DeductionItemSpec::new(Pvd, Some(Retirement), Some(dec!(500000)), None),
            DeductionItemSpec::new(Rmf, Some(Retirement), Some(dec!(500000)), Some(dec!(0.30))),
            DeductionItemSpec::new(ThaiEsg, None, Some(dec!(300000)), Some(dec!(0.30))),
            DeductionItemSpec::new(ThaiEsgx, None, Some(dec!(300000)), Some(dec!(0.30))),
            DeductionItemSpec::new(HomeLoan, None, Some(dec!(100000)), None),
            DeductionItemSpec::new(DonationDouble, None, None, Some(dec!(0.10)))
                .with_multiplier(dec!(2)),
            DeductionItemSpec::new(DonationPolitical, None, Some(dec!(10000)), None),
            DeductionItemSpec::new(EasyEReceipt, None, Some(dec!(50000)), None),
        ];

        let groups = vec![
            GroupSpec {
                group: Insurance,
                cap: dec!(100000),
                policy: ReductionPolicy::Proportional,
            },
            GroupSpec {
                group: Retirement,
                cap: dec!(500000),
                policy: ReductionPolicy::Ordered(vec![Rmf, Pvd, PensionInsurance]),
            },
        ];

        Self { items, groups }
    }

    pub fn item(
        &self,
        id: DeductionItemId,
    ) -> Option<&DeductionItemSpec> {
        self.items.iter().find(|spec| spec.id == id)
    }

    pub fn group(
        &self,
        group: DeductionGroup,
    ) -> Option<&GroupSpec> {
        self.groups.iter().find(|spec| spec.group == group)
    }

    /// Member items of `group`, in catalog order.
    pub fn members(
        &self,
        group: DeductionGroup,
    ) -> impl Iterator<Item = &DeductionItemSpec> {
        self.items
            .iter()
            .filter(move |spec| spec.group == Some(group))
    }
}

impl Default for DeductionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_snake_and_camel_case() {
        assert_eq!(
            DeductionItemId::parse("thai_esgx"),
            Some(DeductionItemId::ThaiEsgx)
        );
        assert_eq!(
            DeductionItemId::parse("easyEreceipt"),
            Some(DeductionItemId::EasyEReceipt)
        );
        assert_eq!(DeductionItemId::parse("lottery"), None);
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for id in DeductionItemId::ALL {
            assert_eq!(DeductionItemId::parse(id.as_str()), Some(id));
        }
    }

    #[test]
    fn standard_catalog_covers_every_item() {
        let catalog = DeductionCatalog::standard();

        for id in DeductionItemId::ALL {
            assert!(catalog.item(id).is_some(), "missing spec for {id}");
        }
        assert_eq!(catalog.members(DeductionGroup::Insurance).count(), 2);
        assert_eq!(catalog.members(DeductionGroup::Retirement).count(), 3);
    }

    #[test]
    fn individual_cap_takes_smaller_of_absolute_and_percent() {
        let catalog = DeductionCatalog::standard();
        let rmf = catalog.item(DeductionItemId::Rmf).unwrap();

        assert_eq!(rmf.individual_cap(dec!(530000)), Some(dec!(159000.00)));
        assert_eq!(rmf.individual_cap(dec!(5000000)), Some(dec!(500000)));
    }

    #[test]
    fn donation_is_doubled_then_capped_at_ten_percent() {
        let catalog = DeductionCatalog::standard();
        let donation = catalog.item(DeductionItemId::DonationDouble).unwrap();

        assert_eq!(donation.clamp(dec!(10000), dec!(530000)), dec!(20000));
        assert_eq!(donation.clamp(dec!(40000), dec!(530000)), dec!(53000.00));
    }

    #[test]
    fn clamp_treats_negative_raw_as_zero() {
        let catalog = DeductionCatalog::standard();
        let home_loan = catalog.item(DeductionItemId::HomeLoan).unwrap();

        assert_eq!(home_loan.clamp(dec!(-500), dec!(530000)), Decimal::ZERO);
    }

    #[test]
    fn clamp_survives_the_largest_decimal() {
        let catalog = DeductionCatalog::standard();
        let donation = catalog.item(DeductionItemId::DonationDouble).unwrap();
        let life = catalog.item(DeductionItemId::LifeInsurance).unwrap();

        assert_eq!(donation.clamp(Decimal::MAX, dec!(530000)), dec!(53000.00));
        assert_eq!(
            life.clamp(Decimal::MAX, dec!(530000)),
            crate::calculations::common::AMOUNT_CEILING
        );
    }
}
