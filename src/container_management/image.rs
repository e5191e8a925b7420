//! Image matching and presentation.

use chrono::{DateTime, Utc};

use super::types::ImageRecord;

/// Images whose OS and release properties match, ignoring case.
pub fn matching_images<'a>(images: &'a [ImageRecord], os: &str, release: &str) -> Vec<&'a ImageRecord> {
    images
        .iter()
        .filter(|image| image.os.eq_ignore_ascii_case(os) && image.release.eq_ignore_ascii_case(release))
        .collect()
}

/// Simplestreams alias of an image, e.g. `ubuntu/bionic`.
pub fn image_alias(os: &str, release: &str) -> String {
    format!("{}/{}", os.to_lowercase(), release.to_lowercase())
}

/// One-line description used when the user picks between candidate images.
pub fn describe_image(image: &ImageRecord, now: DateTime<Utc>) -> String {
    format!(
        "OS - {} | Release - {} | Architecture - {} | Uploaded - {}",
        capitalize(&image.os),
        capitalize(&image.release),
        image.architecture,
        humanize_age(image.uploaded_at, now)
    )
}

/// Coarse relative age, e.g. `3 days ago`.
pub fn humanize_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 0 {
        return "just now".to_string();
    }

    let (amount, unit) = match seconds {
        s if s < 60 => (s, "second"),
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 30 * 86_400 => (s / 86_400, "day"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };

    if amount == 1 {
        format!("{} {} ago", if unit == "hour" { "an" } else { "a" }, unit)
    } else {
        format!("{} {}s ago", amount, unit)
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn image(os: &str, release: &str, fingerprint: &str) -> ImageRecord {
        ImageRecord {
            os: os.to_string(),
            release: release.to_string(),
            architecture: "x86_64".to_string(),
            fingerprint: fingerprint.to_string(),
            uploaded_at: Utc.with_ymd_and_hms(2020, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn matching_ignores_case() {
        let images = vec![
            image("Ubuntu", "bionic", "a"),
            image("ubuntu", "Focal", "b"),
            image("Centos", "8", "c"),
        ];

        let found = matching_images(&images, "ubuntu", "BIONIC");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].fingerprint, "a");
        assert!(matching_images(&images, "centos", "7").is_empty());
    }

    #[test]
    fn alias_is_lowercase() {
        assert_eq!(image_alias("Ubuntu", "Bionic"), "ubuntu/bionic");
    }

    #[test]
    fn description_contains_humanized_age() {
        let record = image("ubuntu", "bionic", "a");
        let now = record.uploaded_at + Duration::days(3);
        assert_eq!(
            describe_image(&record, now),
            "OS - Ubuntu | Release - Bionic | Architecture - x86_64 | Uploaded - 3 days ago"
        );
    }

    #[test]
    fn humanized_units() {
        let then = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(humanize_age(then, then + Duration::seconds(5)), "5 seconds ago");
        assert_eq!(humanize_age(then, then + Duration::minutes(1)), "a minute ago");
        assert_eq!(humanize_age(then, then + Duration::hours(1)), "an hour ago");
        assert_eq!(humanize_age(then, then + Duration::days(65)), "2 months ago");
        assert_eq!(humanize_age(then, then + Duration::days(800)), "2 years ago");
        assert_eq!(humanize_age(then, then - Duration::days(1)), "just now");
    }
}
