//! Self-contained scripts evaluated in the inspected page.
//!
//! Every data script answers with a JSON envelope string:
//! `{"status":"ok","payload":..}`, `{"status":"missing"}` or
//! `{"status":"error","message":".."}`. The debug-mode script answers
//! `{"status":"enabled"|"disabled"|"missing"|"error"}`. None of them touch page state.

pub const TSOFT_META_CHECK: &str = r#"(function () {
  try {
    var meta = document.querySelector('meta[name="copyright"]');
    if (!meta) {
      return false;
    }
    var content = meta.getAttribute("content") || "";
    return content.toLowerCase().includes("t-soft");
  } catch (error) {
    return false;
  }
})();"#;

pub const ACTIVE_PAGE: &str = r#"(function () {
  try {
    return window.location && window.location.href
      ? window.location.href
      : document.location && document.location.href
      ? document.location.href
      : "";
  } catch (error) {
    return "";
  }
})();"#;

pub const DEBUG_MODE: &str = r#"(function () {
  try {
    var flag = typeof TSOFT_DEBUG_MODE !== "undefined" ? TSOFT_DEBUG_MODE : undefined;
    if (typeof flag === "undefined") {
      return JSON.stringify({ status: "missing" });
    }
    var enabled =
      flag === true ||
      flag === "true" ||
      flag === 1 ||
      flag === "1" ||
      flag === "on";
    return JSON.stringify({ status: enabled ? "enabled" : "disabled" });
  } catch (error) {
    return JSON.stringify({ status: "error" });
  }
})();"#;

pub const TRANSLATIONS: &str = r#"(function () {
  try {
    if (typeof TRANSLATES === "undefined") {
      return JSON.stringify({ status: "missing" });
    }
    return JSON.stringify({ status: "ok", payload: TRANSLATES });
  } catch (error) {
    return JSON.stringify({
      status: "error",
      message: error && error.message ? error.message : "Unknown error"
    });
  }
})();"#;

pub const GLOBAL_VARS: &str = r#"(function () {
  try {
    if (typeof TSOFT_GLOBAL_VARS === "undefined") {
      return JSON.stringify({ status: "missing" });
    }
    return JSON.stringify({ status: "ok", payload: TSOFT_GLOBAL_VARS });
  } catch (error) {
    return JSON.stringify({
      status: "error",
      message: error && error.message ? error.message : "Unknown error"
    });
  }
})();"#;

pub const BLOCK_VARS: &str = r#"(function () {
  try {
    if (typeof TSOFT_BLOCK_VARS === "undefined") {
      return JSON.stringify({ status: "missing" });
    }
    return JSON.stringify({ status: "ok", payload: TSOFT_BLOCK_VARS });
  } catch (error) {
    return JSON.stringify({
      status: "error",
      message: error && error.message ? error.message : "Unknown error"
    });
  }
})();"#;
