/// Official tools. Launches and errors of anything else are not recorded.
pub const TOOLS: &[&str] = &[
    "fastlane",
    "fastlane_core",
    "deliver",
    "snapshot",
    "frameit",
    "pem",
    "sigh",
    "produce",
    "cert",
    "gym",
    "pilot",
    "credentials_manager",
    "spaceship",
    "scan",
    "supply",
    "watchbuild",
    "match",
    "screengrab",
];

#[must_use]
pub fn is_official(name: &str) -> bool {
    TOOLS.contains(&name)
}
