use rand::RngExt;

const CHROME_VERSIONS: [&str; 20] = [
    "133.0.6943.50", "133.0.6943.88", "132.0.6834.83", "132.0.6834.110", "131.0.6778.85",
    "131.0.6778.108", "130.0.6723.92", "130.0.6723.117", "129.0.6668.70", "129.0.6668.89",
    "128.0.6613.120", "128.0.6613.138", "127.0.6533.88", "127.0.6533.119", "126.0.6478.126",
    "126.0.6478.182", "125.0.6422.141", "124.0.6367.201", "123.0.6312.122", "122.0.6261.94",
];

const FIREFOX_VERSIONS: [&str; 16] = [
    "133.0", "132.0", "131.0", "130.0", "129.0", "128.0", "127.0", "126.0",
    "125.0", "124.0", "123.0", "122.0", "121.0", "120.0", "119.0", "118.0",
];

const EDGE_VERSIONS: [&str; 10] = [
    "133.0.3048.56", "132.0.2957.55", "131.0.2903.86", "130.0.2849.68", "129.0.2792.52",
    "128.0.2739.79", "127.0.2651.98", "126.0.2592.87", "125.0.2535.92", "124.0.2478.80",
];

const OS_STRINGS: [&str; 20] = [
    // Windows (modern versions more likely)
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; WOW64",
    "Windows NT 6.1; Win64; x64",
    // macOS
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 13_6_9",
    "Macintosh; Intel Mac OS X 14_7_2",
    "Macintosh; Intel Mac OS X 15_2_1",
    "Macintosh; Intel Mac OS X 15_1",
    // Linux (various distributions)
    "X11; Linux x86_64",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
    "X11; Ubuntu 24.04; Linux x86_64",
    "X11; Ubuntu 22.04; Linux x86_64",
    "X11; Fedora; Linux x86_64",
    "X11; Debian 12; Linux x86_64",
    "X11; Arch Linux; Linux x86_64",
    "X11; Linux Mint 22; Linux x86_64",
    "X11; openSUSE Tumbleweed; Linux x86_64",
];

fn gen_chrome_ua() -> String {
    let mut rng = rand::rng();
    let version = CHROME_VERSIONS[rng.random_range(0..CHROME_VERSIONS.len())];
    let os = OS_STRINGS[rng.random_range(0..OS_STRINGS.len())];

    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        os, version
    )
}

fn gen_firefox_ua() -> String {
    let mut rng = rand::rng();
    let version = FIREFOX_VERSIONS[rng.random_range(0..FIREFOX_VERSIONS.len())];
    let os = OS_STRINGS[rng.random_range(0..OS_STRINGS.len())];

    format!(
        "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
        os, version, version
    )
}

fn gen_edge_ua() -> String {
    let mut rng = rand::rng();
    let version = EDGE_VERSIONS[rng.random_range(0..EDGE_VERSIONS.len())];
    // Edge primarily runs on Windows and macOS
    let os_subset = [
        "Windows NT 10.0; Win64; x64",
        "Windows NT 10.0; Win64; x64",
        "Macintosh; Intel Mac OS X 10_15_7",
        "Macintosh; Intel Mac OS X 14_7_1",
    ];
    let os = os_subset[rng.random_range(0..os_subset.len())];
    let chrome_ver = version.split('.').next().unwrap_or("133");

    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36 Edg/{}",
        os, chrome_ver, version
    )
}

fn gen_safari_desktop_ua() -> String {
    let mut rng = rand::rng();
    let macos_systems: Vec<&str> = OS_STRINGS
        .iter()
        .filter(|os| os.starts_with("Macintosh"))
        .copied()
        .collect();
    let os = macos_systems[rng.random_range(0..macos_systems.len())];
    let webkit_versions = ["605.1.15", "604.1", "605.2.3", "618.1.15"];
    let webkit = webkit_versions[rng.random_range(0..webkit_versions.len())];
    let safari_versions = ["18.2", "18.1", "18.0", "17.7", "17.6"];
    let safari_ver = safari_versions[rng.random_range(0..safari_versions.len())];

    format!(
        "Mozilla/5.0 ({}) AppleWebKit/{} (KHTML, like Gecko) Version/{} Safari/{}",
        os, webkit, safari_ver, webkit
    )
}

pub fn gen_random_ua() -> String {
    let mut rng = rand::rng();
    let choice = rng.random_range(0..10);
    match choice {
        0..=4 => gen_chrome_ua(),      // 50% Chrome (most popular)
        5..=6 => gen_firefox_ua(),     // 20% Firefox
        7..=8 => gen_edge_ua(),        // 20% Edge
        _ => gen_safari_desktop_ua(),  // 10% Safari Desktop
    }
}
