//! Pure lookups for WMO weather codes and wind directions.

/// WMO weather interpretation codes, sorted by code.
static WEATHER_CODES: [(i32, &str); 28] = [
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Foggy"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (56, "Light freezing drizzle"),
    (57, "Dense freezing drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (66, "Light freezing rain"),
    (67, "Heavy freezing rain"),
    (71, "Slight snow"),
    (73, "Moderate snow"),
    (75, "Heavy snow"),
    (77, "Snow grains"),
    (80, "Slight rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (85, "Slight snow showers"),
    (86, "Heavy snow showers"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with slight hail"),
    (99, "Thunderstorm with heavy hail"),
];

static COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Converts a WMO weather code to a human-readable condition.
///
/// Only exact table entries match; every other code yields `"Unknown"`.
pub fn condition_from_code(code: i32) -> &'static str {
    WEATHER_CODES
        .binary_search_by_key(&code, |&(c, _)| c)
        .map(|idx| WEATHER_CODES[idx].1)
        .unwrap_or("Unknown")
}

/// Maps wind direction in degrees onto one of 16 compass points.
///
/// Any integer is accepted and normalized into `[0, 360)` first.
pub fn compass_from_degrees(degrees: i32) -> &'static str {
    let normalized = f64::from(degrees.rem_euclid(360));
    let sector = ((normalized + 11.25) / 22.5).floor() as usize;
    COMPASS_POINTS[sector % 16]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_for_binary_search() {
        assert!(WEATHER_CODES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn known_codes() {
        assert_eq!(condition_from_code(0), "Clear sky");
        assert_eq!(condition_from_code(1), "Mainly clear");
        assert_eq!(condition_from_code(48), "Depositing rime fog");
        assert_eq!(condition_from_code(61), "Slight rain");
        assert_eq!(condition_from_code(82), "Violent rain showers");
        assert_eq!(condition_from_code(95), "Thunderstorm");
        assert_eq!(condition_from_code(99), "Thunderstorm with heavy hail");
    }

    #[test]
    fn every_table_entry_round_trips() {
        for (code, text) in WEATHER_CODES {
            assert_eq!(condition_from_code(code), text);
        }
    }

    #[test]
    fn unknown_codes() {
        for code in [-1, 4, 44, 50, 60, 98, 100, 999, i32::MIN, i32::MAX] {
            assert_eq!(condition_from_code(code), "Unknown", "code {code}");
        }
    }

    #[test]
    fn cardinal_and_intercardinal_points() {
        let cases = [
            (0, "N"),
            (45, "NE"),
            (90, "E"),
            (135, "SE"),
            (180, "S"),
            (225, "SW"),
            (270, "W"),
            (315, "NW"),
            (360, "N"),
        ];
        for (degrees, want) in cases {
            assert_eq!(compass_from_degrees(degrees), want, "{degrees} degrees");
        }
    }

    #[test]
    fn sector_boundaries() {
        assert_eq!(compass_from_degrees(11), "N");
        assert_eq!(compass_from_degrees(12), "NNE");
        assert_eq!(compass_from_degrees(348), "NNW");
        assert_eq!(compass_from_degrees(349), "N");
    }

    #[test]
    fn negative_degrees_use_floored_modulo() {
        assert_eq!(compass_from_degrees(-45), "NW");
        assert_eq!(compass_from_degrees(-1), "N");
        assert_eq!(compass_from_degrees(-90), "W");
        assert_eq!(compass_from_degrees(-720), "N");
    }

    #[test]
    fn periodic_in_360() {
        for d in -720..=720 {
            for k in -3..=3 {
                assert_eq!(
                    compass_from_degrees(d),
                    compass_from_degrees(d + 360 * k),
                    "d={d} k={k}"
                );
            }
        }
    }

    #[test]
    fn extreme_inputs_do_not_panic() {
        let _ = compass_from_degrees(i32::MIN);
        let _ = compass_from_degrees(i32::MAX);
    }
}
