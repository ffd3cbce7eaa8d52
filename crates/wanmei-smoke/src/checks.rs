//! What the smoke test looks for.

use serde::Serialize;

/// A selector that must be present on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Check {
    pub selector: &'static str,
    /// Human name printed in the report.
    pub name: &'static str,
}

/// Landmarks every build of the page must keep.
pub const CHECKS: [Check; 9] = [
    Check { selector: ".header", name: "导航栏" },
    Check { selector: ".hero", name: "首屏区域" },
    Check { selector: ".features", name: "核心特性区域" },
    Check { selector: "#download", name: "下载专区" },
    Check { selector: "#pricing", name: "定价方案" },
    Check { selector: "#about", name: "关于我们" },
    Check { selector: ".footer", name: "页脚" },
    Check { selector: ".btn-primary", name: "主按钮" },
    Check { selector: ".nav-menu", name: "导航菜单" },
];

pub const NAV_LINKS: &str = ".nav-link";
pub const DOWNLOAD_BUTTONS: &str = ".btn-download";
pub const NAV_TOGGLE: &str = ".nav-toggle";

/// Viewport used for the mobile menu check.
pub const MOBILE_VIEWPORT: (u32, u32) = (375, 667);
/// Viewport restored afterwards.
pub const DESKTOP_VIEWPORT: (u32, u32) = (1920, 1080);
