#![allow(missing_docs)]

#[cfg(test)]
mod tests {
    use do_restarting::core::config::Config;
    use do_restarting::schedule::{WallClock, check_hour, in_window};

    #[test]
    fn overnight_hour_range_currently_matches_nothing() {
        // A window meant to cross midnight ("22-2") is a reversed range and
        // never matches. Keep this pinned until wraparound is an explicit
        // feature; operators must write "22-23, 0-2" instead.
        for hour in 0..24 {
            assert_eq!(check_hour(hour, &["22-2"]), Ok(false), "hour {hour}");
        }
        assert_eq!(check_hour(23, &["22-23", "0-2"]), Ok(true));
        assert_eq!(check_hour(1, &["22-23", "0-2"]), Ok(true));
    }

    #[test]
    fn reversed_day_range_skips_daemon_every_day() {
        let config = Config::parse_str("[sshd]\ndow = sat-mon\n").expect("valid ini");
        let sshd = config.service("sshd").expect("sshd section");
        for dow in 0..7 {
            assert_eq!(
                in_window(WallClock::new(dow, 12), sshd.dow.as_slice(), sshd.hours.as_slice()),
                Ok(false),
                "dow {dow}"
            );
        }
    }
}
