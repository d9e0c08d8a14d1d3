//! Fixed table of the journals covered by the digest.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JournalDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub publisher: &'static str,
    pub color: &'static str,
    pub issn: &'static str,
    /// `cdjournal` code understood by the J-STAGE search API
    pub code: &'static str,
    pub description: &'static str,
}

impl JournalDescriptor {
    /// Human-facing journal page under the given browse base.
    pub fn browse_url(&self, browse_base: &str) -> String {
        format!("{}/{}/-char/ja", browse_base.trim_end_matches('/'), self.code)
    }
}

pub static JOURNALS: [JournalDescriptor; 6] = [
    JournalDescriptor {
        id: "sangyoeisei",
        name: "産業衛生学雑誌",
        publisher: "日本産業衛生学会",
        color: "#0066cc",
        issn: "1341-0725",
        code: "sangyoeisei",
        description: "産業保健・労働衛生分野の原著論文、総説、症例報告などを掲載。国内最大の産業保健専門誌。",
    },
    JournalDescriptor {
        id: "indhealth",
        name: "Industrial Health",
        publisher: "労働安全衛生総合研究所",
        color: "#006644",
        issn: "0019-8366",
        code: "indhealth",
        description: "世界各国の産業保健研究を掲載する国際英文誌。オープンアクセス。",
    },
    JournalDescriptor {
        id: "ohpfrev",
        name: "産業医学レビュー",
        publisher: "産業医学振興財団",
        color: "#cc3300",
        issn: "1882-5826",
        code: "ohpfrev",
        description: "産業医・産業保健専門職向けの実務に役立つ総説・解説誌。",
    },
    JournalDescriptor {
        id: "jjomh",
        name: "産業精神保健",
        publisher: "日本産業精神保健学会",
        color: "#9933cc",
        issn: "1340-2862",
        code: "jjomh",
        description: "職場のメンタルヘルスに特化。ストレスチェック、復職支援などを掲載。",
    },
    JournalDescriptor {
        id: "jaohn",
        name: "日本産業看護学会誌",
        publisher: "日本産業看護学会",
        color: "#e91e63",
        issn: "2187-2899",
        code: "jaohn",
        description: "産業看護職の実践と研究に関する論文を掲載。",
    },
    JournalDescriptor {
        id: "jaohl",
        name: "産業保健法学会誌",
        publisher: "日本産業保健法学会",
        color: "#336699",
        issn: "2758-5069",
        code: "jaohl",
        description: "産業保健と法律の接点を扱う専門誌。労働安全衛生法、労災認定など。",
    },
];

/// Journal codes searched when the caller does not name any.
pub fn default_codes() -> Vec<String> {
    JOURNALS.iter().map(|j| j.code.to_string()).collect()
}
