//! Endpoint roots and URL building per provider.

use consilium_domain::Provider;

pub const OPENAI_ROOT: &str = "https://api.openai.com";
pub const ANTHROPIC_ROOT: &str = "https://api.anthropic.com";
pub const GEMINI_ROOT: &str = "https://generativelanguage.googleapis.com";
pub const SILICONFLOW_ROOT: &str = "https://api.siliconflow.cn";
pub const MODELSCOPE_INFERENCE_ROOT: &str = "https://api-inference.modelscope.cn/v1";
pub const DASHSCOPE_COMPAT_ROOT: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Trim a configured base url, falling back when blank, without trailing slash
pub fn normalize_base_url(base_url: Option<&str>, fallback: &str) -> String {
    let url = base_url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(fallback)
        .trim();
    url.strip_suffix('/').unwrap_or(url).to_string()
}

/// Default root for providers that talk to a single host
pub fn default_root(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAi => OPENAI_ROOT,
        Provider::Anthropic => ANTHROPIC_ROOT,
        Provider::Gemini => GEMINI_ROOT,
        Provider::SiliconFlow => SILICONFLOW_ROOT,
        Provider::ModelScope => MODELSCOPE_INFERENCE_ROOT,
    }
}

/// Whether the Gemini root is Google's own host, which takes the key as a query parameter
pub fn is_google_host(root: &str) -> bool {
    root.ends_with("generativelanguage.googleapis.com")
}

/// `{root}/v1/chat/completions`, without doubling an existing `/v1`
pub fn chat_url(root: &str) -> String {
    if root.ends_with("/v1") {
        format!("{}/chat/completions", root)
    } else {
        format!("{}/v1/chat/completions", root)
    }
}

/// Roots to try for a ModelScope chat call.
///
/// An explicit base url is used alone. Otherwise the key prefix picks the
/// host: `ms-` keys go to the inference API, `sk-` keys to DashScope, and
/// anything else tries both.
pub fn modelscope_chat_roots(api_key: &str, base_url: Option<&str>) -> Vec<String> {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        return vec![normalize_base_url(Some(url), url)];
    }
    if api_key.starts_with("ms-") {
        vec![MODELSCOPE_INFERENCE_ROOT.to_string()]
    } else if api_key.starts_with("sk-") {
        vec![DASHSCOPE_COMPAT_ROOT.to_string()]
    } else {
        vec![
            MODELSCOPE_INFERENCE_ROOT.to_string(),
            DASHSCOPE_COMPAT_ROOT.to_string(),
        ]
    }
}

/// Roots to try for embeddings: like chat, but unknown keys only try the inference API
pub fn embedding_roots(api_key: &str, base_url: Option<&str>) -> Vec<String> {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        return vec![normalize_base_url(Some(url), url)];
    }
    if api_key.starts_with("sk-") {
        vec![DASHSCOPE_COMPAT_ROOT.to_string()]
    } else {
        vec![MODELSCOPE_INFERENCE_ROOT.to_string()]
    }
}

/// Roots to try when listing ModelScope models: every candidate, most specific first
pub fn modelscope_list_roots(api_key: &str, base_url: Option<&str>) -> Vec<String> {
    let mut roots = Vec::new();
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        roots.push(normalize_base_url(Some(url), url));
    }
    if api_key.starts_with("ms-") {
        roots.push(MODELSCOPE_INFERENCE_ROOT.to_string());
    }
    if api_key.starts_with("sk-") {
        roots.push(DASHSCOPE_COMPAT_ROOT.to_string());
    }
    roots.push(MODELSCOPE_INFERENCE_ROOT.to_string());
    roots.push(DASHSCOPE_COMPAT_ROOT.to_string());

    let mut unique: Vec<String> = Vec::new();
    for root in roots {
        if !unique.contains(&root) {
            unique.push(root);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(None, OPENAI_ROOT), OPENAI_ROOT);
        assert_eq!(normalize_base_url(Some("  "), OPENAI_ROOT), OPENAI_ROOT);
        assert_eq!(
            normalize_base_url(Some(" https://proxy.local/ "), OPENAI_ROOT),
            "https://proxy.local"
        );
    }

    #[test]
    fn test_chat_url_keeps_single_v1() {
        assert_eq!(
            chat_url(DASHSCOPE_COMPAT_ROOT),
            "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
        );
        assert_eq!(chat_url("https://proxy.local"), "https://proxy.local/v1/chat/completions");
    }

    #[test]
    fn test_modelscope_chat_routing() {
        assert_eq!(
            modelscope_chat_roots("ms-abc", None),
            vec![MODELSCOPE_INFERENCE_ROOT]
        );
        assert_eq!(modelscope_chat_roots("sk-abc", None), vec![DASHSCOPE_COMPAT_ROOT]);
        assert_eq!(modelscope_chat_roots("other", None).len(), 2);
        assert_eq!(
            modelscope_chat_roots("ms-abc", Some("https://mirror.local/v1/")),
            vec!["https://mirror.local/v1"]
        );
    }

    #[test]
    fn test_embedding_routing() {
        assert_eq!(embedding_roots("ms-abc", None), vec![MODELSCOPE_INFERENCE_ROOT]);
        assert_eq!(embedding_roots("sk-abc", None), vec![DASHSCOPE_COMPAT_ROOT]);
        assert_eq!(embedding_roots("plain", None), vec![MODELSCOPE_INFERENCE_ROOT]);
    }

    #[test]
    fn test_modelscope_list_roots_deduplicated() {
        assert_eq!(
            modelscope_list_roots("sk-abc", None),
            vec![DASHSCOPE_COMPAT_ROOT, MODELSCOPE_INFERENCE_ROOT]
        );
        assert_eq!(modelscope_list_roots("ms-abc", Some("https://x.local")).len(), 3);
    }

    #[test]
    fn test_google_host() {
        assert!(is_google_host(GEMINI_ROOT));
        assert!(!is_google_host("https://gemini-proxy.local"));
    }
}
