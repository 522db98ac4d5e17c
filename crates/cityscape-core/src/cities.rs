/// A navigable city. The slug keys asset lookups, the label is shown in the
/// nav bar, and the time zone drives the clock widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct City {
    pub slug: &'static str,
    pub label: &'static str,
    pub time_zone: &'static str,
}

pub const CITIES: [City; 7] = [
    City {
        slug: "cupertino",
        label: "Cupertino",
        time_zone: "America/Los_Angeles",
    },
    City {
        slug: "new-york-city",
        label: "New York City",
        time_zone: "America/New_York",
    },
    City {
        slug: "london",
        label: "London",
        time_zone: "Europe/London",
    },
    City {
        slug: "amsterdam",
        label: "Amsterdam",
        time_zone: "Europe/Amsterdam",
    },
    City {
        slug: "tokyo",
        label: "Tokyo",
        time_zone: "Asia/Tokyo",
    },
    City {
        slug: "hong-kong",
        label: "Hong Kong",
        time_zone: "Asia/Hong_Kong",
    },
    City {
        slug: "sydney",
        label: "Sydney",
        time_zone: "Australia/Sydney",
    },
];

#[inline]
pub fn city(index: usize) -> Option<&'static City> {
    CITIES.get(index)
}

#[inline]
pub fn index_of_slug(slug: &str) -> Option<usize> {
    CITIES.iter().position(|c| c.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_unique_and_lookup_roundtrips() {
        for (i, c) in CITIES.iter().enumerate() {
            assert_eq!(index_of_slug(c.slug), Some(i));
        }
        assert_eq!(index_of_slug("atlantis"), None);
    }

    #[test]
    fn every_city_carries_a_time_zone() {
        for c in &CITIES {
            assert!(c.time_zone.contains('/'), "{} has no IANA zone", c.slug);
        }
    }
}
