//! Data categories and the layout table that drives classification and the search sheet

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical data type of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    License,
    Npi,
    Exclusion,
    Preclusion,
    OptOut,
    Ofac,
    Ssdmf,
    Missing,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::License,
        Category::Npi,
        Category::Exclusion,
        Category::Preclusion,
        Category::OptOut,
        Category::Ofac,
        Category::Ssdmf,
        Category::Missing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::License => "license",
            Category::Npi => "npi",
            Category::Exclusion => "exclusion",
            Category::Preclusion => "preclusion",
            Category::OptOut => "opt_out",
            Category::Ofac => "ofac",
            Category::Ssdmf => "ssdmf",
            Category::Missing => "missing",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Prefix used for worksheet names, e.g. `license_`
    pub fn sheet_prefix(&self) -> String {
        format!("{}_", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a file name is matched to a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// File name starts with the pattern
    Prefix(String),
    /// File name contains the pattern anywhere; claims the file before any prefix rule
    Contains(String),
}

impl MatchRule {
    pub fn pattern(&self) -> &str {
        match self {
            MatchRule::Prefix(p) | MatchRule::Contains(p) => p,
        }
    }
}

/// One row of the category table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLayout {
    pub category: Category,
    pub rule: MatchRule,
    /// 1-based search sheet row holding the header block; the formula goes one row below
    pub row: u32,
    pub headers: Vec<String>,
}

impl CategoryLayout {
    fn new(category: Category, rule: MatchRule, row: u32, headers: &[&str]) -> Self {
        Self {
            category,
            rule,
            row,
            headers: headers.iter().map(|h| h.to_string()).collect(),
        }
    }

    /// Rows occupied on the search sheet (header row and formula row)
    pub fn rows(&self) -> (u32, u32) {
        (self.row, self.row + 1)
    }
}

/// Classify a file name against the category table.
///
/// Substring rules are checked first; a file claimed by one of them is never
/// considered by a prefix rule. Among rules of the same kind the earliest
/// table row wins.
pub fn classify(file_name: &str, layouts: &[CategoryLayout]) -> Option<Category> {
    let contains_match = layouts.iter().find(|layout| match &layout.rule {
        MatchRule::Contains(pattern) => file_name.contains(pattern.as_str()),
        MatchRule::Prefix(_) => false,
    });
    if let Some(layout) = contains_match {
        return Some(layout.category);
    }

    layouts
        .iter()
        .find(|layout| match &layout.rule {
            MatchRule::Prefix(pattern) => file_name.starts_with(pattern.as_str()),
            MatchRule::Contains(_) => false,
        })
        .map(|layout| layout.category)
}

/// The production category table
pub fn default_layouts() -> Vec<CategoryLayout> {
    vec![
        CategoryLayout::new(
            Category::License,
            MatchRule::Prefix("dnpi_license_bcbs_sc_".to_string()),
            3,
            &[
                "first_name",
                "middle_name",
                "last_name",
                "organization_name",
                "monitored_product",
                "issuer",
                "license_type",
                "license_source",
                "multi_stata",
                "license_category",
                "verified_first_name",
                "verified_middle_name",
                "verified_last_name",
                "verified_org_name",
                "verified_license_action",
                "verified_license_issued",
                "verified_license_number",
                "verified_license_status",
                "verified_license_details",
                "verified_license_expiration",
                "calculated_license_status",
                "board_action_text",
                "abms_moc_status",
                "abms_renewal_date",
                "abms_duration_type",
                "abms_reverification_date",
                "dea_schedules",
                "dea_license_state",
            ],
        ),
        CategoryLayout::new(
            Category::Npi,
            MatchRule::Prefix("dnpi_npi_bcbs_sc_".to_string()),
            101,
            &[
                "first_name",
                "middle_name",
                "last_name",
                "organization_name",
                "monitored_product",
                "ein",
                "nppes_npi",
                "entity_type",
                "last_update_date",
                "replacement_npi",
                "nppes_last_name",
                "nppes_first_name",
                "nppes_credentials",
                "nppes_middle_name",
                "nppes_name_prefix",
                "nppes_name_suffix",
                "nppes_organization_name",
                "is_sole_proprietor",
                "provider_gender_code",
                "npi_deactivation_date",
                "npi_reactivation_date",
                "npi_deactivation_reason",
                "provider_enumeration_date",
                "mailing_address_of_residence",
                "mailing_address_line_2_of_residence",
                "mailing_fax_of_residence",
                "mailing_zip_of_residence",
                "mailing_city_of_residence",
                "mailing_state_of_residence",
                "mailing_county_of_residence",
                "mailing_country_of_residence",
                "mailing_telephone_of_residence",
                "practice_address_of_residence",
                "practice_address_line_2_of_residence",
                "practice_fax_of_residence",
                "practice_zip_of_residence",
                "practice_city_of_residence",
                "practice_state_of_residence",
                "practice_county_of_residence",
                "practice_country_of_residence",
                "practice_telephone_of_residence",
                "nppes_licenses_taxonomies",
            ],
        ),
        CategoryLayout::new(
            Category::Exclusion,
            MatchRule::Prefix("dnpi_exclusion_bcbs_sc_".to_string()),
            110,
            &[
                "first_name",
                "middle_name",
                "last_name",
                "organization_name",
                "monitored_product",
                "akas",
                "cage",
                "dbas",
                "npis",
                "type",
                "upin",
                "source",
                "address_of_residence",
                "address_line_2_of_residence",
                "fax_of_residence",
                "zip_of_residence",
                "city_of_residence",
                "state_of_residence",
                "county_of_residence",
                "country_of_residence",
                "telephone_of_residence",
                "comments",
                "source_id",
                "speciality",
                "dob",
                "duns_numbers",
                "exclusion_code",
                "start_date",
                "exclusion_date",
                "exclusion_term",
                "reinstate_date",
                "delisted_date",
                "classification",
                "exclusion_notes",
                "prefix",
                "suffix",
                "exclusion_last",
                "exclusion_first",
                "exclusion_middle",
                "exclusion_former_last",
                "exclusion_license_number",
                "excluding_agency",
                "provider_number",
                "exclusion_organization_name",
            ],
        ),
        CategoryLayout::new(
            Category::Preclusion,
            MatchRule::Prefix("dnpi_preclusion_bcbs_sc_".to_string()),
            120,
            &[
                "monitored_product",
                "first_name",
                "middle_name",
                "last_name",
                "organization_name",
                "dob",
                "ein",
                "address_lines",
                "city",
                "state",
                "postal",
                "general",
                "speciality",
                "business_name",
                "preclusion_npi",
                "preclusion_id",
                "excluded_date",
                "reinstated_date",
                "claim_rejected_date",
                "preclusion_first_name",
                "preclusion_last_name",
                "preclusion_middle_name",
                "preclusion_former_last_name",
            ],
        ),
        CategoryLayout::new(
            Category::OptOut,
            MatchRule::Prefix("dnpi_opt_out_bcbs_sc_".to_string()),
            130,
            &[
                "monitored_product",
                "first_name",
                "middle_name",
                "last_name",
                "organization_name",
                "address_lines",
                "city",
                "state",
                "postal",
                "speciality",
                "opt_out_id",
                "optout_npi",
                "effective_date",
                "end_date",
                "optout_first_name",
                "optout_last_name",
                "optout_former_last_name",
                "eligible_to_order_and_refer",
            ],
        ),
        CategoryLayout::new(
            Category::Ofac,
            MatchRule::Prefix("dnpi_ofac_bcbs_sc_".to_string()),
            140,
            &[
                "npi",
                "first_name",
                "middle_name",
                "last_name",
                "organization_name",
                "monitored_product",
                "monitored_start_date",
                "monitored_end_date",
                "ofac_organization_name",
                "ofac_first_name",
                "ofac_middle_name",
                "ofac_last_name",
                "ofac_suffix",
                "ofac_date_of_birth",
                "ofac_npi",
                "ofac_tin",
                "ofac_specialty",
                "ofac_country",
                "ofac_date",
                "ofac_reinstate_date",
                "ofac_terms",
                "ofac_comments",
            ],
        ),
        CategoryLayout::new(
            Category::Ssdmf,
            MatchRule::Prefix("dnpi_ssdmf_bcbs_sc_".to_string()),
            150,
            &[
                "npi",
                "first_name",
                "middle_name",
                "last_name",
                "ssn",
                "monitored_product",
                "monitored_start_date",
                "monitored_end_date",
                "status",
                "last_verify_time",
                "verification_result",
                "ssdmf_first",
                "ssdmf_last",
                "ssdmf_date_of_birth",
                "ssdmf_date_of_death",
            ],
        ),
        CategoryLayout::new(
            Category::Missing,
            MatchRule::Contains("npi_missing_license_creds".to_string()),
            160,
            &["npi"],
        ),
    ]
}
