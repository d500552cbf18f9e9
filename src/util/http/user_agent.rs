use rand::Rng;

const FIREFOX_VERSIONS: [&str; 12] = [
    "133.0", "132.0", "131.0", "130.0", "129.0", "128.0", "127.0", "126.0", "125.0", "124.0",
    "123.0", "122.0",
];

const CHROME_VERSIONS: [&str; 14] = [
    "133.0.6943.50", "133.0.6943.88", "132.0.6834.83", "132.0.6834.110", "131.0.6778.85",
    "131.0.6778.108", "130.0.6723.92", "130.0.6723.117", "129.0.6668.70", "129.0.6668.89",
    "128.0.6613.120", "127.0.6533.88", "126.0.6478.126", "125.0.6422.141",
];

const EDGE_VERSIONS: [&str; 8] = [
    "133.0.3048.56", "132.0.2957.55", "131.0.2903.86", "130.0.2849.68", "129.0.2792.52",
    "128.0.2739.79", "127.0.2651.98", "126.0.2592.87",
];

/// 證交所網頁只在桌機瀏覽器上測試過，這裡只挑桌機平台
const DESKTOP_OS: [&str; 9] = [
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; WOW64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 13_6_5",
    "Macintosh; Intel Mac OS X 14_7_1",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
    "X11; Fedora; Linux x86_64",
];

fn pick<'a>(items: &[&'a str]) -> &'a str {
    items[rand::rng().random_range(..items.len())]
}

fn gen_firefox_ua() -> String {
    let version = pick(&FIREFOX_VERSIONS);
    format!(
        "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
        pick(&DESKTOP_OS),
        version,
        version
    )
}

fn gen_chrome_ua() -> String {
    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        pick(&DESKTOP_OS),
        pick(&CHROME_VERSIONS)
    )
}

fn gen_edge_ua() -> String {
    let version = pick(&EDGE_VERSIONS);
    let chrome_ver = version.split('.').next().unwrap_or("133");
    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36 Edg/{}",
        pick(&DESKTOP_OS[..6]),
        chrome_ver,
        version
    )
}

pub fn gen_random_ua() -> String {
    match rand::rng().random_range(0..10) {
        0..=5 => gen_chrome_ua(),
        6..=7 => gen_firefox_ua(),
        _ => gen_edge_ua(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ua_formats() {
        for _ in 0..100 {
            let ua = gen_random_ua();
            assert!(ua.starts_with("Mozilla/5.0"), "UA should start with Mozilla/5.0: {}", ua);
            assert!(ua.len() > 50, "UA should be reasonably long: {}", ua);
        }
    }

    #[test]
    fn test_edge_ua_matches_chromium_major() {
        let ua = gen_edge_ua();
        let edg = ua.rsplit("Edg/").next().unwrap();
        let major = edg.split('.').next().unwrap();
        assert!(ua.contains(&format!("Chrome/{}.0.0.0", major)), "{}", ua);
    }
}
