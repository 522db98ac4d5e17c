//! URL resolution for photos, panoramas and the shared earth texture.
//!
//! Photos come from a public placeholder service keyed by the city label;
//! each URL carries a random cache-buster so a rebuilt wall shows a fresh
//! set. The RNG is injected so callers (and tests) control the draw.

use crate::cities::City;
use rand::Rng;

pub const PHOTO_COUNT: usize = 35;
pub const PHOTO_WIDTH: u32 = 800;
pub const PHOTO_HEIGHT: u32 = 600;
pub const EARTH_TEXTURE_URL: &str = "https://i.imgur.com/YQmV3FM.jpg";

const PHOTO_HOST: &str = "https://loremflickr.com";
const CACHE_BUSTER_RANGE: u32 = 1000;

/// City label with whitespace stripped, as the photo service expects.
pub fn compact_label(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn photo_url(city: &City, rng: &mut impl Rng) -> String {
    format!(
        "{}/{}/{}/{}?random={}",
        PHOTO_HOST,
        PHOTO_WIDTH,
        PHOTO_HEIGHT,
        compact_label(city.label),
        rng.gen_range(0..CACHE_BUSTER_RANGE)
    )
}

pub fn photo_urls(city: &City, count: usize, rng: &mut impl Rng) -> Vec<String> {
    (0..count).map(|_| photo_url(city, rng)).collect()
}

/// Fixed 360 panorama per city. Cities without an entry have no panorama and
/// the view toggle must refuse rather than fetch a bogus URL.
pub fn panorama_url(slug: &str) -> Option<&'static str> {
    match slug {
        "cupertino" => Some("https://i.imgur.com/AcxpOnH.jpeg"),
        "new-york-city" => Some("https://i.imgur.com/TAS54cs.jpeg"),
        "london" => Some("https://i.imgur.com/EeeHSWE.jpeg"),
        "amsterdam" => Some("https://i.imgur.com/kAZ0ALt.jpeg"),
        "tokyo" => Some("https://i.imgur.com/6fndpTM.jpeg"),
        "hong-kong" => Some("https://i.imgur.com/7ukk0wI.jpeg"),
        "sydney" => Some("https://i.imgur.com/siaLuSy.jpeg"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::CITIES;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn photo_urls_have_requested_count_and_compact_label() {
        let mut rng = StdRng::seed_from_u64(7);
        let nyc = &CITIES[1];
        let urls = photo_urls(nyc, PHOTO_COUNT, &mut rng);
        assert_eq!(urls.len(), PHOTO_COUNT);
        for url in &urls {
            assert!(url.starts_with("https://"));
            assert!(url.contains("/NewYorkCity?random="), "bad url: {url}");
            assert!(!url.contains(' '));
            let n: u32 = url.rsplit('=').next().unwrap().parse().unwrap();
            assert!(n < CACHE_BUSTER_RANGE);
        }
    }

    #[test]
    fn photo_urls_are_deterministic_for_a_seed() {
        let nyc = &CITIES[1];
        let a = photo_urls(nyc, 5, &mut StdRng::seed_from_u64(42));
        let b = photo_urls(nyc, 5, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn every_city_has_a_panorama() {
        for c in &CITIES {
            let url = panorama_url(c.slug);
            assert!(url.is_some(), "{} lacks a panorama", c.slug);
            assert!(url.unwrap().starts_with("https://"));
        }
    }

    #[test]
    fn unknown_slug_has_no_panorama() {
        assert_eq!(panorama_url("atlantis"), None);
        assert_eq!(panorama_url(""), None);
    }
}
