//! Prompt builders for the two chat requests the AI route makes.

use crate::feed::text::{truncate, ELLIPSIS};
use crate::models::{Article, SourceCitation};
use crate::types::{LLMMessage, LLMRequest, ToolSpec};

/// Articles quoted to the model and returned as sources.
pub const MAX_CONTEXT_ARTICLES: usize = 5;
/// Abstract excerpt length inside the article digest.
pub const CONTEXT_ABSTRACT_LIMIT: usize = 150;

pub const KEYWORDS_MAX_TOKENS: u32 = 100;
pub const SUMMARY_MAX_TOKENS: u32 = 2000;

/// Only public guidance from the labour ministry is searched.
pub const WEB_SEARCH_DOMAINS: [&str; 1] = ["mhlw.go.jp"];
pub const WEB_SEARCH_MAX_USES: u32 = 1;

pub const SOURCE_TYPE_PAPER: &str = "📄 論文";

pub fn keyword_request(model: &str, query: &str) -> LLMRequest {
    let prompt = format!(
        "以下の質問から、論文検索に使用する日本語キーワードを2〜3個抽出してください。\n\
         キーワードのみをカンマ区切りで出力してください。説明は不要です。\n\n\
         質問: {query}\n\n\
         出力例: ストレスチェック, メンタルヘルス, 職場"
    );
    LLMRequest {
        model: model.to_string(),
        max_tokens: KEYWORDS_MAX_TOKENS,
        messages: vec![LLMMessage::user(prompt)],
        tools: None,
    }
}

pub fn synthesis_request(model: &str, query: &str, articles: &[Article], web_search: bool) -> LLMRequest {
    let prompt = format!(
        "産業保健の専門家として回答してください。\n\n\
         【質問】{query}\n\n\
         {context}\n\n\
         【指示】\n\
         1. 厚生労働省(mhlw.go.jp)で関連情報を検索\n\
         2. 論文と公的資料を統合して回答（400-600字）\n\n\
         【出力ルール】※厳守\n\
         ・見出しは「■現状」「■対策」のように■だけを使う\n\
         ・「##」「###」「**」は絶対に使わない\n\
         ・箇条書きは「・」を使う\n\
         ・参考URLは最後にまとめる",
        context = articles_context(articles),
    );
    LLMRequest {
        model: model.to_string(),
        max_tokens: SUMMARY_MAX_TOKENS,
        messages: vec![LLMMessage::user(prompt)],
        tools: web_search.then(|| vec![ToolSpec::web_search(WEB_SEARCH_MAX_USES, &WEB_SEARCH_DOMAINS)]),
    }
}

/// Numbered digest of the first few articles; empty when there are none.
pub fn articles_context(articles: &[Article]) -> String {
    if articles.is_empty() {
        return String::new();
    }
    let mut context = String::from("\n\n【検索された論文】\n");
    for (i, article) in articles.iter().take(MAX_CONTEXT_ARTICLES).enumerate() {
        context.push_str(&format!("\n{}. {}\n", i + 1, article.title));
        context.push_str(&format!("   雑誌: {} {}年\n", article.journal, article.year));
        if let Some(abstract_text) = article.abstract_text.as_deref().filter(|a| !a.is_empty()) {
            context.push_str(&format!(
                "   抄録: {}\n",
                truncate(abstract_text, CONTEXT_ABSTRACT_LIMIT, ELLIPSIS)
            ));
        }
    }
    context
}

pub fn sources_from(articles: &[Article]) -> Vec<SourceCitation> {
    articles
        .iter()
        .take(MAX_CONTEXT_ARTICLES)
        .map(|a| SourceCitation {
            title: a.title.clone(),
            link: a.link.clone(),
            kind: SOURCE_TYPE_PAPER.to_string(),
            meta: format!("{} {}年", a.journal, a.year),
        })
        .collect()
}
