// Classification ruleset: the category dictionaries, weights, and marker
// vocabularies that drive extraction, expressed as data.
//
// `ClassificationRuleset` is the serializable form (the built-in tables below,
// or a JSON file pointed to by ATSFIT_RULESET_PATH). `Classifier` is the
// compiled lookup structure the extractor, matcher, and injection engine
// share. Adding a category term means editing a table or a JSON file, never
// the extraction code.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::models::Category;
use crate::text::{contains_whole_word, normalize_term};

/// One `{pattern-set, category, weight}` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    /// Multiplier applied to scores of terms in this category
    pub weight: f64,
    /// Dictionary hits are guaranteed a place in the keyword set
    #[serde(default)]
    pub mandatory: bool,
    /// Canonical display forms; matching is case-insensitive
    pub terms: Vec<String>,
}

/// Serializable ruleset. See `builtin()` for the shipped defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRuleset {
    pub version: u32,
    pub rules: Vec<CategoryRule>,
    /// Uncategorized multi-word phrases worth extracting as a unit
    #[serde(default)]
    pub phrases: Vec<String>,
    /// Terms rendered upper-case in the skills section
    #[serde(default)]
    pub acronyms: Vec<String>,
    /// Leading verbs after which a descriptive modifier may be inserted
    #[serde(default)]
    pub action_verbs: Vec<String>,
    /// Words never extracted on their own (on top of the English stop list)
    #[serde(default)]
    pub noise_words: Vec<String>,
    /// Markers that elevate nearby terms ("requirements", "must have")
    #[serde(default)]
    pub requirement_markers: Vec<String>,
    /// Markers that depress nearby terms ("benefits", "about us")
    #[serde(default)]
    pub low_value_markers: Vec<String>,
    #[serde(default = "default_requirement_weight")]
    pub requirement_weight: f64,
    #[serde(default = "default_low_value_weight")]
    pub low_value_weight: f64,
}

fn default_requirement_weight() -> f64 {
    1.35
}

fn default_low_value_weight() -> f64 {
    0.3
}

const LANGUAGES: &[&str] = &[
    "Python", "Java", "JavaScript", "TypeScript", "Golang", "Rust", "C++", "C#", "Ruby", "PHP",
    "Kotlin", "Swift", "Scala", "SQL", "Bash", "Perl", "Elixir", "Haskell", "Dart",
    "Objective-C", "MATLAB", "Lua", "Clojure", "F#", "Groovy", "Solidity", "HTML", "CSS",
];

const FRAMEWORKS: &[&str] = &[
    "React", "Angular", "Vue.js", "Next.js", "Node.js", "Express.js", "Django", "Flask",
    "FastAPI", "Spring Boot", "Ruby on Rails", ".NET", "ASP.NET", "Laravel", "Svelte", "jQuery",
    "TensorFlow", "PyTorch", "scikit-learn", "Pandas", "NumPy", "GraphQL", "gRPC", "Tokio",
    "Flutter", "React Native", "Redux", "Tailwind CSS", "Hibernate", "Kubeflow",
];

const CLOUD_DEVOPS: &[&str] = &[
    "AWS", "Azure", "GCP", "Google Cloud", "Docker", "Kubernetes", "Terraform", "Ansible",
    "Jenkins", "CI/CD", "GitHub Actions", "GitLab CI", "Helm", "Prometheus", "Grafana", "Linux",
    "AWS Lambda", "EC2", "S3", "CloudFormation", "Serverless", "DevOps", "Microservices",
    "OpenShift", "Argo CD", "Datadog", "Nginx", "Git", "Infrastructure as Code", "Kafka",
    "Site Reliability Engineering", "Observability",
];

const SECURITY: &[&str] = &[
    "Cybersecurity", "OAuth", "SAML", "SSO", "IAM", "Penetration Testing", "Threat Modeling",
    "SIEM", "Zero Trust", "Encryption", "Vulnerability Management", "OWASP",
    "Identity Management", "Network Security", "Incident Response", "Application Security",
];

const DATA_TOOLS: &[&str] = &[
    "PostgreSQL", "MySQL", "MongoDB", "Redis", "Elasticsearch", "Snowflake", "BigQuery",
    "Redshift", "Databricks", "Apache Spark", "Spark", "Hadoop", "Airflow", "dbt", "Tableau",
    "Power BI", "Looker", "Microsoft Excel", "Kafka", "Cassandra", "DynamoDB", "ETL", "Data Pipelines",
    "Data Warehouse", "Machine Learning", "Deep Learning", "Data Analysis", "NoSQL",
    "Data Visualization", "Statistics", "A/B Testing",
];

const COMPLIANCE: &[&str] = &[
    "HIPAA", "GDPR", "SOC 2", "SOX", "PCI DSS", "ISO 27001", "FedRAMP", "CCPA", "NIST", "FERPA",
    "FINRA", "AML", "KYC",
];

const CRM: &[&str] = &[
    "Salesforce", "HubSpot", "Zendesk", "Marketo", "Dynamics 365", "Pipedrive", "ServiceNow",
    "Intercom", "Gainsight", "Salesloft",
];

const METHODOLOGIES: &[&str] = &[
    "Agile", "Scrum", "Kanban", "Lean Six Sigma", "Six Sigma", "Test-Driven Development", "TDD",
    "Design Patterns", "Code Review", "Jira", "Confluence", "Waterfall", "SAFe", "OKRs",
];

const HARD_SKILLS: &[&str] = &[
    "REST APIs", "API Design", "System Design", "Distributed Systems", "Unit Testing",
    "Integration Testing", "Debugging", "Performance Tuning", "Data Modeling", "Automation",
    "Cloud Architecture", "Project Management", "Product Management", "Technical Writing",
    "Budgeting", "Forecasting", "Financial Modeling", "Software Development",
    "Web Development", "Mobile Development", "Full Stack", "Object-Oriented Programming",
    "Algorithms", "Data Structures", "Troubleshooting", "Scalability",
];

const SOFT_SKILLS: &[&str] = &[
    "Communication", "Leadership", "Collaboration", "Problem Solving", "Teamwork", "Mentoring",
    "Stakeholder Management", "Cross-Functional Collaboration", "Time Management",
    "Critical Thinking", "Adaptability", "Attention to Detail", "Presentation Skills",
    "Negotiation", "Customer Focus", "Strategic Thinking",
];

const PHRASES: &[&str] = &[
    "cross-functional teams", "code quality", "user experience", "product development",
    "customer success", "business requirements", "technical leadership",
    "continuous integration", "continuous delivery", "software engineering",
    "high availability", "event-driven architecture", "root cause analysis",
    "data-driven decisions", "developer experience", "platform engineering",
    "backend services", "frontend development", "production systems", "data quality",
];

const ACRONYMS: &[&str] = &[
    "AWS", "GCP", "SQL", "API", "APIs", "REST", "CI/CD", "ETL", "HIPAA", "GDPR", "SOC", "SOX",
    "IAM", "SSO", "SAML", "NLP", "ML", "AI", "UI", "UX", "QA", "SDK", "CRM", "ERP", "KPI",
    "HTML", "CSS", "JSON", "XML", "HTTP", "TCP", "DNS", "VPN", "PCI", "DSS", "ISO", "NIST",
    "TDD", "BDD", "SRE", "EC2", "S3", "RDS", "GKE", "EKS", "AKS", "JVM", "SIEM", "OWASP",
    "CCPA", "AML", "KYC", "PHP", "SAFE", "OKR",
];

const ACTION_VERBS: &[&str] = &[
    "Led", "Delivered", "Implemented", "Built", "Developed", "Designed", "Engineered",
    "Architected", "Created", "Launched", "Deployed", "Automated", "Migrated", "Managed",
    "Drove", "Established", "Spearheaded", "Optimized", "Improved", "Streamlined",
    "Integrated", "Maintained", "Scaled", "Reduced", "Increased", "Owned", "Coordinated",
    "Directed", "Oversaw", "Shipped", "Refactored", "Modernized",
];

const NOISE_WORDS: &[&str] = &[
    "experience", "experienced", "work", "working", "team", "teams", "years", "year", "role",
    "ability", "able", "strong", "including", "etc", "job", "company", "candidate",
    "candidates", "opportunity", "opportunities", "responsibilities", "responsibility",
    "requirements", "requirement", "qualifications", "qualification", "preferred", "required",
    "plus", "must", "will", "well", "knowledge", "understanding", "skills", "skill",
    "excellent", "good", "great", "new", "using", "use", "used", "based", "within", "across",
    "help", "join", "looking", "ideal", "bonus", "nice", "make", "also", "like", "want",
    "need", "needs", "environment", "position", "apply", "please", "equivalent", "degree",
    "related", "field", "minimum", "least", "proven", "demonstrated", "solid", "hands",
    "level", "day", "days", "time", "full", "part", "benefits", "salary", "passion",
    "passionate", "world", "people", "ensure", "drive", "support", "build", "building",
    "work", "remote", "hybrid", "office", "location", "you'll", "we're", "you're", "they're",
    "every", "one", "two", "three", "five", "plus", "own", "role's", "company's", "etc.",
    "e.g", "i.e", "per", "via", "can", "may", "wide", "range", "variety", "fast", "paced",
    "fast-paced", "self-starter", "familiarity", "familiar", "comfortable", "similar",
];

const REQUIREMENT_MARKERS: &[&str] = &[
    "requirements", "qualifications", "must have", "must-have", "required", "what you'll need",
    "what you bring", "what we're looking for", "who you are", "you have", "skills",
    "minimum qualifications", "preferred qualifications", "nice to have", "experience with",
    "proficiency in", "proficient in", "expertise in",
];

const LOW_VALUE_MARKERS: &[&str] = &[
    "benefits", "perks", "about us", "about the company", "who we are", "our mission",
    "our story", "legal", "compensation", "salary", "equal opportunity", "privacy",
    "what we offer", "our culture",
];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl ClassificationRuleset {
    /// The shipped ruleset.
    pub fn builtin() -> Self {
        let rule = |category, weight, mandatory, terms: &[&str]| CategoryRule {
            category,
            weight,
            mandatory,
            terms: to_strings(terms),
        };

        Self {
            version: 1,
            rules: vec![
                rule(Category::Language, 1.4, true, LANGUAGES),
                rule(Category::Framework, 1.25, true, FRAMEWORKS),
                rule(Category::CloudDevOps, 1.3, true, CLOUD_DEVOPS),
                rule(Category::Security, 1.3, true, SECURITY),
                rule(Category::DataTool, 1.2, true, DATA_TOOLS),
                rule(Category::Compliance, 1.3, true, COMPLIANCE),
                rule(Category::Crm, 1.15, true, CRM),
                rule(Category::Methodology, 1.1, true, METHODOLOGIES),
                rule(Category::HardSkill, 1.1, false, HARD_SKILLS),
                rule(Category::SoftSkill, 1.0, true, SOFT_SKILLS),
            ],
            phrases: to_strings(PHRASES),
            acronyms: to_strings(ACRONYMS),
            action_verbs: to_strings(ACTION_VERBS),
            noise_words: to_strings(NOISE_WORDS),
            requirement_markers: to_strings(REQUIREMENT_MARKERS),
            low_value_markers: to_strings(LOW_VALUE_MARKERS),
            requirement_weight: default_requirement_weight(),
            low_value_weight: default_low_value_weight(),
        }
    }

    /// Parse a ruleset from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let ruleset: Self = serde_json::from_str(json).context("Invalid ruleset JSON")?;
        if ruleset.rules.is_empty() {
            anyhow::bail!("Ruleset v{} defines no category rules", ruleset.version);
        }
        Ok(ruleset)
    }

    /// Load a JSON ruleset from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ruleset at {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to load ruleset {}", path.display()))
    }

    /// Build the lookup structure used at extraction time.
    pub fn compile(&self) -> Classifier {
        Classifier::new(self)
    }
}

/// What the ruleset knows about one term.
#[derive(Debug, Clone)]
pub struct TermInfo {
    pub display: String,
    pub categories: BTreeSet<Category>,
    pub mandatory: bool,
}

/// Compiled, read-only view of a ruleset.
#[derive(Debug, Clone)]
pub struct Classifier {
    version: u32,
    terms: HashMap<String, TermInfo>,
    phrases: Vec<String>,
    acronyms: HashSet<String>,
    action_verbs: Vec<String>,
    noise: HashSet<String>,
    requirement_markers: Vec<String>,
    low_value_markers: Vec<String>,
    requirement_weight: f64,
    low_value_weight: f64,
    weights: BTreeMap<Category, f64>,
}

impl Default for Classifier {
    fn default() -> Self {
        ClassificationRuleset::builtin().compile()
    }
}

impl Classifier {
    pub fn new(ruleset: &ClassificationRuleset) -> Self {
        let mut terms: HashMap<String, TermInfo> = HashMap::new();
        let mut weights: BTreeMap<Category, f64> = BTreeMap::new();

        for rule in &ruleset.rules {
            let weight = weights.entry(rule.category).or_insert(rule.weight);
            *weight = weight.max(rule.weight);

            for term in &rule.terms {
                let key = normalize_term(term);
                if key.is_empty() {
                    continue;
                }
                let info = terms.entry(key).or_insert_with(|| TermInfo {
                    display: term.trim().to_string(),
                    categories: BTreeSet::new(),
                    mandatory: false,
                });
                info.categories.insert(rule.category);
                info.mandatory |= rule.mandatory;
            }
        }

        // Every multi-word dictionary term doubles as a phrase candidate
        let mut phrases: Vec<String> = terms
            .keys()
            .filter(|k| k.contains(' '))
            .cloned()
            .chain(ruleset.phrases.iter().map(|p| normalize_term(p)))
            .collect();
        phrases.sort();
        phrases.dedup();

        let lower_set =
            |items: &[String]| -> HashSet<String> { items.iter().map(|s| s.to_lowercase()).collect() };
        let lower_vec =
            |items: &[String]| -> Vec<String> { items.iter().map(|s| s.to_lowercase()).collect() };

        Self {
            version: ruleset.version,
            terms,
            phrases,
            acronyms: lower_set(&ruleset.acronyms),
            action_verbs: ruleset.action_verbs.clone(),
            noise: lower_set(&ruleset.noise_words),
            requirement_markers: lower_vec(&ruleset.requirement_markers),
            low_value_markers: lower_vec(&ruleset.low_value_markers),
            requirement_weight: ruleset.requirement_weight,
            low_value_weight: ruleset.low_value_weight,
            weights,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn lookup(&self, term: &str) -> Option<&TermInfo> {
        self.terms.get(&normalize_term(term))
    }

    pub fn is_known(&self, term: &str) -> bool {
        self.lookup(term).is_some()
    }

    /// Categories for a term. Unknown multi-word terms inherit the categories
    /// of their known constituent words.
    pub fn classify(&self, term: &str) -> BTreeSet<Category> {
        if let Some(info) = self.lookup(term) {
            return info.categories.clone();
        }
        let key = normalize_term(term);
        if key.contains(' ') {
            return key
                .split(' ')
                .filter_map(|w| self.terms.get(w))
                .flat_map(|info| info.categories.iter().copied())
                .collect();
        }
        BTreeSet::new()
    }

    /// Largest category weight among `categories`, or 1.0 for none.
    pub fn category_boost(&self, categories: &BTreeSet<Category>) -> f64 {
        categories
            .iter()
            .filter_map(|c| self.weights.get(c).copied())
            .fold(None, |best: Option<f64>, w| Some(best.map_or(w, |b| b.max(w))))
            .unwrap_or(1.0)
    }

    /// All mandatory dictionary terms with their info.
    pub fn mandatory_terms(&self) -> impl Iterator<Item = &TermInfo> {
        self.terms.values().filter(|info| info.mandatory)
    }

    /// Multi-word phrase library (normalized, lowercase).
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Single-word dictionary terms of at least `min_len` letters/digits,
    /// used to split concatenated tokens.
    pub fn single_word_terms(&self, min_len: usize) -> Vec<&str> {
        let mut words: Vec<&str> = self
            .terms
            .keys()
            .filter(|k| !k.contains(' ') && k.len() >= min_len)
            .filter(|k| k.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(String::as_str)
            .collect();
        // longest first so "javascript" wins over "java"
        words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        words
    }

    pub fn is_noise(&self, word: &str) -> bool {
        self.noise.contains(&word.to_lowercase())
    }

    pub fn is_acronym(&self, word: &str) -> bool {
        self.acronyms.contains(&word.to_lowercase())
    }

    pub fn action_verbs(&self) -> &[String] {
        &self.action_verbs
    }

    pub fn is_action_verb(&self, word: &str) -> bool {
        self.action_verbs.iter().any(|v| v.eq_ignore_ascii_case(word))
    }

    /// Weight for text governed by a header line, if the header is a marker.
    pub fn header_weight(&self, header: &str) -> Option<f64> {
        let lower = header.to_lowercase();
        if self.low_value_markers.iter().any(|m| lower.contains(m.as_str())) {
            Some(self.low_value_weight)
        } else if self.requirement_markers.iter().any(|m| lower.contains(m.as_str())) {
            Some(self.requirement_weight)
        } else {
            None
        }
    }

    /// Weight for a sentence judged by its own markers (used when no header
    /// governs it). Requirement phrasing scores slightly below a header.
    pub fn sentence_weight(&self, sentence: &str) -> f64 {
        if self.low_value_markers.iter().any(|m| contains_whole_word(sentence, m)) {
            self.low_value_weight
        } else if self.requirement_markers.iter().any(|m| contains_whole_word(sentence, m)) {
            (self.requirement_weight - 0.05).max(1.0)
        } else {
            1.0
        }
    }

    /// Form used inside prose: the canonical display form when known,
    /// upper-case for acronyms, otherwise unchanged.
    pub fn display_form(&self, term: &str) -> String {
        if let Some(info) = self.lookup(term) {
            return info.display.clone();
        }
        if self.is_acronym(term) {
            return term.to_uppercase();
        }
        term.trim().to_string()
    }

    /// Form used in the skills list: canonical when known, otherwise each
    /// word capitalized with acronyms preserved.
    pub fn skill_form(&self, term: &str) -> String {
        if let Some(info) = self.lookup(term) {
            return info.display.clone();
        }
        term.split_whitespace()
            .map(|word| {
                if self.is_acronym(word) {
                    word.to_uppercase()
                } else if let Some(info) = self.terms.get(&word.to_lowercase()) {
                    info.display.clone()
                } else {
                    capitalize(word)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
