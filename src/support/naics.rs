//! Two-digit NAICS sector names for employment data.

/// Returns the sector name for a two-digit NAICS code, if known.
///
/// Sectors spanning several codes share a name (31–33 are all
/// `"Manufacturing"`, 44–45 are `"Retail"`).
///
/// # Example
///
/// ```
/// use urbansim_utils::support::naics::naics_name;
///
/// assert_eq!(naics_name(52), Some("Finance and Insurance"));
/// assert_eq!(naics_name(10), None);
/// ```
#[must_use]
pub fn naics_name(code: u32) -> Option<&'static str> {
    let name = match code {
        11 => "Agriculture",
        21 => "Mining",
        22 => "Utilities",
        23 => "Construction",
        31..=33 => "Manufacturing",
        42 => "Wholesale",
        44 | 45 => "Retail",
        48 => "Transportation",
        49 => "Warehousing",
        51 => "Information",
        52 => "Finance and Insurance",
        53 => "Real Estate",
        54 => "Professional",
        55 => "Management",
        56 => "Administrative",
        61 => "Educational",
        62 => "Health Care",
        71 => "Arts",
        72 => "Accomodation and Food",
        81 => "Other",
        92 => "Public",
        99 => "Unknown",
        _ => return None,
    };
    Some(name)
}
