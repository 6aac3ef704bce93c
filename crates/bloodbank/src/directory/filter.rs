//! Donor search filters.

use crate::model::{BloodGroup, Donor};

/// Availability criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    /// Any donor.
    #[default]
    All,
    /// Only donors marked available.
    Yes,
    /// Only donors marked unavailable.
    No,
}

impl Availability {
    fn accepts(self, available: bool) -> bool {
        match self {
            Self::All => true,
            Self::Yes => available,
            Self::No => !available,
        }
    }
}

/// Criteria for [`Directory::list_donors`](super::Directory::list_donors).
///
/// All criteria must hold. The default filter matches every donor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorFilter {
    /// Free text matched against name, phone, email, city and blood group.
    pub query: String,
    /// Exact blood group, or `None` for any.
    pub blood_group: Option<BloodGroup>,
    /// Substring of the city.
    pub city: String,
    /// Availability criterion.
    pub availability: Availability,
}

impl DonorFilter {
    /// A filter that matches everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text query.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Restrict to one blood group.
    #[must_use]
    pub fn blood_group(mut self, blood_group: BloodGroup) -> Self {
        self.blood_group = Some(blood_group);
        self
    }

    /// Restrict to cities containing `city`.
    #[must_use]
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    /// Restrict by availability.
    #[must_use]
    pub fn availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Compile the filter into a reusable matcher.
    #[must_use]
    pub(crate) fn matcher(&self) -> Matcher<'_> {
        Matcher {
            query: self.query.trim().to_lowercase(),
            city: self.city.to_lowercase(),
            filter: self,
        }
    }
}

/// A filter with its needles lowercased once.
pub(crate) struct Matcher<'a> {
    query: String,
    city: String,
    filter: &'a DonorFilter,
}

impl Matcher<'_> {
    pub(crate) fn matches(&self, donor: &Donor) -> bool {
        self.matches_query(donor)
            && self
                .filter
                .blood_group
                .map_or(true, |group| donor.blood_group == group)
            && (self.city.is_empty() || donor.city.to_lowercase().contains(&self.city))
            && self.filter.availability.accepts(donor.available)
    }

    fn matches_query(&self, donor: &Donor) -> bool {
        if self.query.is_empty() {
            return true;
        }
        [
            donor.name.as_str(),
            donor.phone.as_str(),
            donor.email.as_str(),
            donor.city.as_str(),
            donor.blood_group.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&self.query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;

    fn donor(name: &str, city: &str, blood_group: BloodGroup, available: bool) -> Donor {
        Donor {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            age: 35,
            gender: Gender::Male,
            blood_group,
            phone: "9123456780".to_string(),
            email: format!("{}@mail.test", name.to_lowercase().replace(' ', ".")),
            city: city.to_string(),
            last_donation_date: None,
            available,
            notes: None,
        }
    }

    fn matches(filter: &DonorFilter, donor: &Donor) -> bool {
        filter.matcher().matches(donor)
    }

    #[test]
    fn test_default_filter_matches_everything() {
        let filter = DonorFilter::new();
        assert!(matches(&filter, &donor("A B", "X", BloodGroup::ONegative, false)));
        assert!(matches(&filter, &donor("C D", "Y", BloodGroup::AbPositive, true)));
    }

    #[test]
    fn test_query_is_trimmed_and_case_insensitive() {
        let d = donor("Jane Doe", "Pune", BloodGroup::APositive, true);
        assert!(matches(&DonorFilter::new().query("  JANE "), &d));
        assert!(matches(&DonorFilter::new().query("pun"), &d));
        assert!(matches(&DonorFilter::new().query("9123"), &d));
        assert!(matches(&DonorFilter::new().query("mail.test"), &d));
        assert!(!matches(&DonorFilter::new().query("john"), &d));
    }

    #[test]
    fn test_query_matches_blood_group_label() {
        let d = donor("Ravi", "Delhi", BloodGroup::AbNegative, true);
        assert!(matches(&DonorFilter::new().query("ab-"), &d));
        assert!(!matches(&DonorFilter::new().query("o+"), &d));
    }

    #[test]
    fn test_blood_group_exact() {
        let d = donor("Ravi", "Delhi", BloodGroup::APositive, true);
        assert!(matches(&DonorFilter::new().blood_group(BloodGroup::APositive), &d));
        assert!(!matches(&DonorFilter::new().blood_group(BloodGroup::ANegative), &d));
    }

    #[test]
    fn test_city_substring() {
        let d = donor("Ravi", "New Delhi", BloodGroup::BPositive, true);
        assert!(matches(&DonorFilter::new().city("DELHI"), &d));
        assert!(!matches(&DonorFilter::new().city("Mumbai"), &d));
    }

    #[test]
    fn test_availability() {
        let on = donor("On", "X", BloodGroup::OPositive, true);
        let off = donor("Off", "X", BloodGroup::OPositive, false);
        let yes = DonorFilter::new().availability(Availability::Yes);
        let no = DonorFilter::new().availability(Availability::No);
        assert!(matches(&yes, &on));
        assert!(!matches(&yes, &off));
        assert!(matches(&no, &off));
        assert!(!matches(&no, &on));
    }

    #[test]
    fn test_criteria_combine_with_and() {
        let d = donor("Jane Doe", "Pune", BloodGroup::APositive, true);
        let filter = DonorFilter::new()
            .query("jane")
            .blood_group(BloodGroup::APositive)
            .city("pune")
            .availability(Availability::No);
        assert!(!matches(&filter, &d));
    }
}
