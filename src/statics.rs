// Central place for UI strings and other non-localized constants.
// Keep these out of gui.rs and the state machine to reduce duplication and make tweaks safer.

use std::time::Duration;

// Fetch timing
pub const MAX_FETCH_RETRY: u32 = 5;
pub const FETCH_RETRY_DELAY: Duration = Duration::from_millis(500);
pub const NAVIGATION_DEBOUNCE: Duration = Duration::from_millis(700);
pub const CDP_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

// DevTools endpoint defaults
pub const DEFAULT_DEVTOOLS_HOST: &str = "127.0.0.1";
pub const DEFAULT_DEVTOOLS_PORT: u16 = 9222;

// Settings persistence
pub const SETTINGS_DIR_NAME: &str = "tsoft-devtools";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const THEME_STORAGE_KEY: &str = "tsoft_devtools_theme";

// Light theme between these local hours (start inclusive, end exclusive).
pub const LIGHT_THEME_FROM_HOUR: u32 = 7;
pub const LIGHT_THEME_UNTIL_HOUR: u32 = 19;

// English UI strings (EN_ prefix to make future localization easier)
pub const EN_APP_TITLE: &str = "T-Soft Devtools";

pub const EN_TAB_TRANSLATIONS: &str = "Translations";
pub const EN_TAB_GLOBAL_VARS: &str = "Global Variables";
pub const EN_TAB_BLOCK_VARS: &str = "Block Variables";

pub const EN_BTN_REFRESH: &str = "Refresh";
pub const EN_BTN_OPEN_ALL: &str = "Open All";
pub const EN_BTN_CLOSE_ALL: &str = "Close All";
pub const EN_BTN_PREV: &str = "^";
pub const EN_BTN_NEXT: &str = "v";
pub const EN_BTN_THEME_DARK: &str = "Dark Theme";
pub const EN_BTN_THEME_LIGHT: &str = "Light Theme";
pub const EN_BTN_COPY_KEY: &str = "Copy key";
pub const EN_BTN_COPY_VALUE: &str = "Copy value";

pub const EN_HINT_SEARCH_TRANSLATIONS: &str = "Search key or value";
pub const EN_HINT_SEARCH_GLOBAL_VARS: &str = "Search global variables";
pub const EN_HINT_SEARCH_BLOCK_VARS: &str = "Search blocks or variables";

pub const EN_LABEL_ACTIVE_PAGE: &str = "Active page:";
pub const EN_ACTIVE_PAGE_LOADING: &str = "Reading page info...";
pub const EN_ACTIVE_PAGE_UNAVAILABLE: &str = "Could not read the active page.";

pub const EN_DEBUG_WARNING: &str =
    "Debug mode is not enabled on this page. Set TSOFT_DEBUG_MODE to inspect variables.";
pub const EN_UNSUPPORTED_PAGE: &str =
    "No T-Soft copyright meta tag was found on the inspected page.";
pub const EN_PROBING_PAGE: &str = "Checking the inspected page...";

pub const EN_STATUS_WAITING_AUTH: &str = "Waiting for authorization...";
pub const EN_UNKNOWN_ERROR: &str = "Unknown error";

pub const EN_BLOCK_NO_VARS: &str = "No variables defined for this block.";
pub const EN_BLOCK_DEFAULT_PREFIX: &str = "Block";
pub const EN_SCALAR_ENTRY_KEY: &str = "value";
pub const EN_BLOCK_SCALAR_ENTRY_KEY: &str = "vars";
pub const EN_ITEMS_SUFFIX: &str = "items";

// Per-dataset status lines. "{n}"-style counts and page messages are prefixed/suffixed in dataset.rs.
pub const EN_TR_LOADING: &str = "Loading translation data...";
pub const EN_TR_EMPTY: &str = "No translation entries found.";
pub const EN_TR_NO_MATCH: &str = "No translation entries match your search.";
pub const EN_TR_LISTED: &str = "translation groups listed.";
pub const EN_TR_READ_FAILED: &str = "An error occurred while reading translation data.";
pub const EN_TR_UNDECODABLE: &str = "Translation data could not be decoded.";
pub const EN_TR_PAGE_ERROR: &str = "Translation data could not be read:";

pub const EN_GV_LOADING: &str = "Loading global data...";
pub const EN_GV_EMPTY: &str = "No global variables found.";
pub const EN_GV_NO_MATCH: &str = "No global variables match your search.";
pub const EN_GV_LISTED: &str = "global values listed.";
pub const EN_GV_READ_FAILED: &str = "An error occurred while reading global data.";
pub const EN_GV_UNDECODABLE: &str = "Global data could not be decoded.";
pub const EN_GV_PAGE_ERROR: &str = "Global data could not be read:";

pub const EN_BV_LOADING: &str = "Loading block data...";
pub const EN_BV_EMPTY: &str = "No block variables found.";
pub const EN_BV_NO_MATCH: &str = "No blocks match your search.";
pub const EN_BV_LISTED: &str = "blocks listed.";
pub const EN_BV_READ_FAILED: &str = "An error occurred while reading block data.";
pub const EN_BV_UNDECODABLE: &str = "Block data could not be decoded.";
pub const EN_BV_PAGE_ERROR: &str = "Block data could not be read:";

pub const EN_NOT_DEFINED_SUFFIX: &str = "is not defined.";

// Page globals read by the evaluation scripts (named in "missing" status messages).
pub const PAGE_GLOBAL_TRANSLATIONS: &str = "TRANSLATES";
pub const PAGE_GLOBAL_GLOBAL_VARS: &str = "TSOFT_GLOBAL_VARS";
pub const PAGE_GLOBAL_BLOCK_VARS: &str = "TSOFT_BLOCK_VARS";
