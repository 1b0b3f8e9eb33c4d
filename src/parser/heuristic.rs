//! Heuristic phase: line-oriented section parser
//!
//! Free text is read line by line with a small state machine. A heading
//! line switches the current section (and may carry an inline value);
//! every other non-blank line is an item of the current section. The
//! collected sections are then assembled into the target record.
//!
//! Grammar:
//! - heading: optional `#`s, optional `**` emphasis, a known label
//!   (case-insensitive), an optional parenthetical, then end of line or
//!   `:`/`：` followed by an inline value
//! - item: any other line; leading bullets (`-`, `*`, `•`, `1.`, `1、`,
//!   `(1)`) and checkboxes are stripped
//! - key/value item: split on the first separator of [`SEPARATORS`] present
//!   in the line; no separator means an auto-generated key
//! - trailing notes: `(depends on: a, b)`, `(deliverable: …)` on tasks and
//!   `(metric: …)` on page sections; a component key may name its root tag
//!   as `hero (header): …`

use crate::models::{
    Component, ComponentChild, PageSection, PageSpec, Prd, RecordKind, RoleAssignment, RolePlan,
    StructuredRecord, TaskItem, TaskPlan,
};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Key/value separators in priority order
pub const SEPARATORS: &[&str] = &["：", ":", " - ", "—", "→", "->", "|"];

/// Tags recognised at the start of a component child hint
const KNOWN_TAGS: &[&str] = &[
    "a", "article", "aside", "button", "div", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "img", "input", "li", "main", "nav", "ol", "p", "section", "span",
    "table", "ul", "video",
];

static BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-+•·●○◦▪–]\s*|\*\s+|\d{1,3}(?:[.)]\s+|、\s*)|[(（]\d{1,3}[)）]\s*)(?:\[[ xX✓]\]\s*)?")
        .expect("valid bullet regex")
});

static DEPENDS_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[(（]\s*(?:depends on|depends|dependencies|deps|依赖|前置)\s*[:：]?\s*([^()（）]*)[)）]\s*$")
        .expect("valid dependency regex")
});

static METRIC_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[(（]\s*(?:success metric|metric|kpi|成功指标|衡量指标|指标)\s*[:：]\s*([^()（）]*)[)）]\s*$")
        .expect("valid metric regex")
});

static DELIVERABLE_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[(（]\s*(?:deliverable|output|交付物|交付|产出)\s*[:：]\s*([^()（）]*)[)）]\s*$")
        .expect("valid deliverable regex")
});

static ROOT_TAG_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\s*[(（]\s*<?([A-Za-z][A-Za-z0-9]*)>?\s*[)）]$").expect("valid root tag regex")
});

static LIST_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,，、;；]").expect("valid delimiter regex"));

static ID_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,，、;；\s]+").expect("valid id delimiter regex"));

/// Section the state machine is currently filling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Product,
    Goals,
    TargetUsers,
    PageSections,
    Layout,
    Colors,
    Components,
    Summary,
    Tasks,
    Roles,
    /// Task list of the roster role at this index
    Role(usize),
}

impl Section {
    /// Sections holding a single text value rather than a list
    fn is_single(&self) -> bool {
        matches!(self, Section::Product | Section::Layout | Section::Summary)
    }

    /// List sections whose lines may pack several comma-separated items
    fn is_delimited(&self) -> bool {
        matches!(self, Section::Colors | Section::Roles)
    }
}

const REQUIREMENTS_LABELS: &[(Section, &[&str])] = &[
    (
        Section::Product,
        &["product", "product name", "title", "产品", "产品名称", "产品名", "标题"],
    ),
    (Section::Goals, &["goals", "goal", "objectives", "目标", "产品目标"]),
    (
        Section::TargetUsers,
        &["target users", "target audience", "audience", "users", "目标用户", "用户", "受众"],
    ),
    (
        Section::PageSections,
        &["page sections", "sections", "page structure", "页面模块", "页面结构", "页面板块", "模块", "板块"],
    ),
];

const PAGE_SPEC_LABELS: &[(Section, &[&str])] = &[
    (Section::Layout, &["layout", "布局", "页面布局"]),
    (
        Section::Colors,
        &["colors", "colours", "color palette", "palette", "颜色", "配色", "色彩", "主色调"],
    ),
    (Section::Components, &["components", "组件", "页面组件"]),
];

const TASK_PLAN_LABELS: &[(Section, &[&str])] = &[
    (Section::Summary, &["summary", "overview", "总结", "摘要", "概述"]),
    (
        Section::Tasks,
        &["tasks", "task list", "prioritized tasks", "任务", "任务列表", "任务清单"],
    ),
];

const ROLE_PLAN_LABELS: &[(Section, &[&str])] = &[
    (Section::Roles, &["available roles", "roles", "可用角色", "角色"]),
    (
        Section::Tasks,
        &["tasks", "task list", "assignments", "任务", "任务清单", "任务分配"],
    ),
];

struct HeadingRule {
    section: Section,
    label: String,
}

/// Heading labels for one record kind
pub struct LineGrammar {
    rules: Vec<HeadingRule>,
    /// Single-value section fed by the first line when no heading precedes it
    title: Option<Section>,
}

impl LineGrammar {
    pub fn for_kind(kind: RecordKind, roster: &[String]) -> Self {
        let (table, title): (&[(Section, &[&str])], Option<Section>) = match kind {
            RecordKind::Requirements => (REQUIREMENTS_LABELS, Some(Section::Product)),
            RecordKind::PageSpec => (PAGE_SPEC_LABELS, Some(Section::Layout)),
            RecordKind::TaskPlan => (TASK_PLAN_LABELS, Some(Section::Summary)),
            RecordKind::RolePlan => (ROLE_PLAN_LABELS, None),
        };

        let mut rules: Vec<HeadingRule> = table
            .iter()
            .flat_map(|(section, labels)| {
                labels.iter().map(move |label| HeadingRule {
                    section: *section,
                    label: label.to_string(),
                })
            })
            .collect();

        if kind == RecordKind::RolePlan {
            rules.extend(roster.iter().enumerate().map(|(idx, role)| HeadingRule {
                section: Section::Role(idx),
                label: role.clone(),
            }));
        }

        // Longest label first so "目标用户" wins over "目标"
        rules.sort_by(|a, b| b.label.chars().count().cmp(&a.label.chars().count()));

        Self { rules, title }
    }

    /// Match a trimmed line against the heading grammar
    pub fn match_heading(&self, line: &str) -> Option<(Section, Option<String>)> {
        if BULLET.is_match(line) {
            return None;
        }

        let text = line.trim_start_matches('#').replace("**", "").replace("__", "");
        let text = text.trim();

        for rule in &self.rules {
            let Some(rest) = strip_prefix_ci(text, &rule.label) else {
                continue;
            };
            let rest = skip_parenthetical(rest.trim_start());
            if rest.is_empty() {
                return Some((rule.section, None));
            }
            if let Some(value) = rest.strip_prefix(':').or_else(|| rest.strip_prefix('：')) {
                let value = value.trim();
                let inline = (!value.is_empty()).then(|| value.to_string());
                return Some((rule.section, inline));
            }
        }
        None
    }
}

/// Case-insensitive `strip_prefix` that keeps the original casing of the rest
fn strip_prefix_ci<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let mut chars = text.char_indices();
    for expected in label.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    let idx = chars.next().map(|(idx, _)| idx).unwrap_or(text.len());
    Some(&text[idx..])
}

/// Skip a leading "(...)" / "（...）" such as "目标（Goals）："
fn skip_parenthetical(text: &str) -> &str {
    let close = if text.starts_with('(') {
        ')'
    } else if text.starts_with('（') {
        '）'
    } else {
        return text;
    };
    match text.find(close) {
        Some(idx) => text[idx + close.len_utf8()..].trim_start(),
        None => text,
    }
}

/// Remove a leading bullet, number or checkbox
pub fn strip_bullet(line: &str) -> &str {
    match BULLET.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

/// Split on the first separator present; `None` when no separator applies
pub fn split_key_value(line: &str) -> Option<(String, String)> {
    SEPARATORS.iter().find_map(|sep| {
        let (key, value) = line.split_once(sep)?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), value.trim().to_string()))
    })
}

/// Split a trailing annotation matched by `note` off the end of `line`
fn split_note(line: &str, note: &Regex) -> (String, Option<String>) {
    match note.captures(line) {
        Some(caps) => {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(line.len());
            let value = caps.get(1).map(|m| m.as_str().trim().to_string());
            (line[..start].trim().to_string(), value.filter(|v| !v.is_empty()))
        }
        None => (line.trim().to_string(), None),
    }
}

fn split_delimited(text: &str) -> Vec<String> {
    LIST_DELIMITER
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sections collected from free text
#[derive(Debug, Default)]
pub struct SectionDoc {
    singles: HashMap<Section, String>,
    lists: HashMap<Section, Vec<String>>,
    /// Section lists in first-seen order (role sections need it)
    order: Vec<Section>,
    /// First line seen before any heading
    title: Option<String>,
}

impl SectionDoc {
    fn touch(&mut self, section: Section) {
        if !self.order.contains(&section) {
            self.order.push(section);
        }
    }

    fn capture(&mut self, section: Section, value: &str) {
        self.touch(section);
        if section.is_single() {
            let slot = self.singles.entry(section).or_default();
            if !slot.is_empty() {
                slot.push('\n');
            }
            slot.push_str(value);
            return;
        }

        let list = self.lists.entry(section).or_default();
        if section.is_delimited() {
            list.extend(split_delimited(value));
        } else {
            list.push(value.to_string());
        }
    }

    pub fn single(&self, section: Section) -> Option<&str> {
        self.singles.get(&section).map(String::as_str)
    }

    pub fn list(&self, section: Section) -> &[String] {
        self.lists.get(&section).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// Markdown horizontal rule ("---", "***", "===")
fn is_rule(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '-' | '*' | '_' | '=' | ' '))
}

/// Run the section state machine over `raw`
pub fn scan_sections(raw: &str, grammar: &LineGrammar) -> SectionDoc {
    let mut doc = SectionDoc::default();
    let mut current: Option<Section> = None;
    let mut seen_heading = false;

    for raw_line in raw.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("```") || is_rule(line) {
            continue;
        }

        if let Some((section, inline)) = grammar.match_heading(line) {
            current = Some(section);
            seen_heading = true;
            doc.touch(section);
            if let Some(value) = inline {
                doc.capture(section, &value);
            }
            continue;
        }

        let item = strip_bullet(line);
        if item.is_empty() {
            continue;
        }

        match current {
            Some(section) => doc.capture(section, item),
            None if !seen_heading && doc.title.is_none() => {
                doc.title = Some(item.to_string());
            }
            None => {}
        }
    }

    doc
}

/// Parse `raw` into a best-effort record; never fails
pub fn parse_heuristic(raw: &str, kind: RecordKind, roster: &[String]) -> StructuredRecord {
    let grammar = LineGrammar::for_kind(kind, roster);
    let doc = scan_sections(raw, &grammar);
    let title = || {
        grammar
            .title
            .and_then(|section| doc.single(section))
            .or_else(|| doc.title())
            .unwrap_or_default()
            .to_string()
    };

    match kind {
        RecordKind::Requirements => StructuredRecord::Requirements(Prd {
            product: title(),
            goals: doc.list(Section::Goals).to_vec(),
            target_users: doc.list(Section::TargetUsers).to_vec(),
            page_sections: assemble_page_sections(doc.list(Section::PageSections)),
        }),
        RecordKind::PageSpec => StructuredRecord::PageSpec(PageSpec {
            layout: title(),
            colors: doc.list(Section::Colors).to_vec(),
            components: assemble_components(doc.list(Section::Components)),
        }),
        RecordKind::TaskPlan => StructuredRecord::TaskPlan(TaskPlan {
            summary: title(),
            tasks: assemble_tasks(doc.list(Section::Tasks)),
        }),
        RecordKind::RolePlan => StructuredRecord::RolePlan(assemble_role_plan(&doc, roster)),
    }
}

fn assemble_page_sections(items: &[String]) -> Vec<PageSection> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let (body, metric) = split_note(item, &METRIC_NOTE);
            let (id, purpose) = split_key_value(&body)
                .unwrap_or_else(|| (format!("section-{}", idx + 1), body.clone()));
            PageSection {
                id,
                purpose,
                success_metric: metric,
            }
        })
        .collect()
}

fn assemble_components(items: &[String]) -> Vec<Component> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let (key, value) = split_key_value(item)
                .unwrap_or_else(|| (format!("component-{}", idx + 1), item.clone()));
            let (id, root_tag) = split_root_tag(&key);
            Component {
                id,
                root_tag,
                children: split_delimited(&value).iter().map(|hint| parse_child(hint)).collect(),
            }
        })
        .collect()
}

/// `hero (header)` names the root tag; anything else keeps `section`
fn split_root_tag(key: &str) -> (String, String) {
    if let Some(caps) = ROOT_TAG_KEY.captures(key) {
        let id = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let tag = caps.get(2).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
        if !id.is_empty() && KNOWN_TAGS.contains(&tag.as_str()) {
            return (id.to_string(), tag);
        }
    }
    (key.to_string(), "section".to_string())
}

fn parse_child(hint: &str) -> ComponentChild {
    let (head, tail) = hint
        .split_once(char::is_whitespace)
        .unwrap_or((hint, ""));
    let tag = head.trim_matches(|c| c == '<' || c == '>' || c == '/').to_lowercase();

    if KNOWN_TAGS.contains(&tag.as_str()) {
        ComponentChild {
            tag,
            content_hint: tail.trim().to_string(),
        }
    } else {
        ComponentChild {
            tag: "div".to_string(),
            content_hint: hint.to_string(),
        }
    }
}

fn assemble_tasks(items: &[String]) -> Vec<TaskItem> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let mut body = item.trim().to_string();
            let mut deps = None;
            let mut deliverable = None;
            // Notes may come in either order; peel them off the end
            loop {
                if DEPENDS_NOTE.is_match(&body) {
                    let (rest, value) = split_note(&body, &DEPENDS_NOTE);
                    body = rest;
                    deps = deps.or(value);
                } else if DELIVERABLE_NOTE.is_match(&body) {
                    let (rest, value) = split_note(&body, &DELIVERABLE_NOTE);
                    body = rest;
                    deliverable = deliverable.or(value);
                } else {
                    break;
                }
            }
            let (id, description) = split_key_value(&body)
                .unwrap_or_else(|| (format!("task-{}", idx + 1), body.clone()));
            let depends_on = deps
                .map(|deps| {
                    ID_DELIMITER
                        .split(&deps)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            TaskItem {
                id,
                description,
                depends_on,
                deliverable,
            }
        })
        .collect()
}

fn assemble_role_plan(doc: &SectionDoc, roster: &[String]) -> RolePlan {
    let mut assignments: Vec<RoleAssignment> = Vec::new();
    let mut assign = |role: &str, tasks: Vec<String>| {
        match assignments.iter_mut().find(|a| a.role == role) {
            Some(existing) => existing.tasks.extend(tasks),
            None => assignments.push(RoleAssignment {
                role: role.to_string(),
                tasks,
            }),
        }
    };

    for section in &doc.order {
        match section {
            Section::Role(idx) => {
                if let Some(role) = roster.get(*idx) {
                    let tasks = doc
                        .list(*section)
                        .iter()
                        .flat_map(|item| item.split(['；', ';']))
                        .map(str::trim)
                        .filter(|task| !task.is_empty())
                        .map(str::to_string)
                        .collect();
                    assign(role, tasks);
                }
            }
            Section::Tasks => {
                for item in doc.list(Section::Tasks) {
                    if let Some((key, task)) = split_key_value(item) {
                        let role = roster
                            .iter()
                            .find(|r| r.eq_ignore_ascii_case(&key))
                            .cloned()
                            .unwrap_or(key);
                        let tasks = (!task.is_empty()).then_some(task).into_iter().collect();
                        assign(&role, tasks);
                    }
                }
            }
            _ => {}
        }
    }

    RolePlan {
        available_roles: doc.list(Section::Roles).to_vec(),
        tasks: assignments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prd(raw: &str) -> Prd {
        parse_heuristic(raw, RecordKind::Requirements, &[])
            .as_prd()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_inline_heading_and_bulleted_list() {
        let prd = prd("产品：瓜子\n目标：\n- 提升转化");
        assert_eq!(prd.product, "瓜子");
        assert_eq!(prd.goals, vec!["提升转化"]);
        assert!(prd.target_users.is_empty());
    }

    #[test]
    fn test_longest_label_wins() {
        let prd = prd("目标用户：\n- 年轻家庭\n目标：\n- 提升转化");
        assert_eq!(prd.target_users, vec!["年轻家庭"]);
        assert_eq!(prd.goals, vec!["提升转化"]);
    }

    #[test]
    fn test_markdown_headings_and_english_labels() {
        let raw = "# Product: Sunflower Seeds\n\n## Goals\n1. Raise conversion\n2. Build trust\n\n**Target Users**\n* Families\n";
        let prd = prd(raw);
        assert_eq!(prd.product, "Sunflower Seeds");
        assert_eq!(prd.goals, vec!["Raise conversion", "Build trust"]);
        assert_eq!(prd.target_users, vec!["Families"]);
    }

    #[test]
    fn test_first_line_is_title_fallback() {
        let prd = prd("新疆葵花籽宣传页\n\n目标：\n- 春节促销");
        assert_eq!(prd.product, "新疆葵花籽宣传页");
        assert_eq!(prd.goals, vec!["春节促销"]);
    }

    #[test]
    fn test_bulleted_line_is_never_a_heading() {
        let prd = prd("目标：\n- 目标：翻倍销量");
        assert_eq!(prd.goals, vec!["目标：翻倍销量"]);
    }

    #[test]
    fn test_heading_without_colon_must_stand_alone() {
        let prd = prd("目标：\n- a\n目标用户增长很快");
        // Not a heading, so it stays an item of the goals list
        assert_eq!(prd.goals, vec!["a", "目标用户增长很快"]);
    }

    #[test]
    fn test_parenthetical_label() {
        let prd = prd("目标（Goals）：\n- 提升转化");
        assert_eq!(prd.goals, vec!["提升转化"]);
    }

    #[test]
    fn test_page_sections_key_value_and_auto_id() {
        let raw = "页面模块：\n- hero：首屏大图（指标：点击率）\n- 产品卖点展示";
        let prd = prd(raw);
        assert_eq!(prd.page_sections.len(), 2);
        assert_eq!(prd.page_sections[0].id, "hero");
        assert_eq!(prd.page_sections[0].purpose, "首屏大图");
        assert_eq!(prd.page_sections[0].success_metric.as_deref(), Some("点击率"));
        assert_eq!(prd.page_sections[1].id, "section-2");
        assert_eq!(prd.page_sections[1].purpose, "产品卖点展示");
    }

    #[test]
    fn test_separator_priority() {
        assert_eq!(
            split_key_value("setup-html: create skeleton - base"),
            Some(("setup-html".to_string(), "create skeleton - base".to_string()))
        );
        assert_eq!(
            split_key_value("hero → banner | cta"),
            Some(("hero".to_string(), "banner | cta".to_string()))
        );
        assert_eq!(
            split_key_value("footer | contact"),
            Some(("footer".to_string(), "contact".to_string()))
        );
        assert_eq!(split_key_value("kebab-case-only"), None);
    }

    #[test]
    fn test_page_spec_colors_and_components() {
        let raw = "布局：单列滚动\n配色：#C8102E, #FFD700、#FFFFFF\n组件：\n- hero: h1 主标题, p 副标题, 立即购买\n- footer";
        let record = parse_heuristic(raw, RecordKind::PageSpec, &[]);
        let spec = record.as_page_spec().unwrap();
        assert_eq!(spec.layout, "单列滚动");
        assert_eq!(spec.colors, vec!["#C8102E", "#FFD700", "#FFFFFF"]);
        assert_eq!(spec.components.len(), 2);

        let hero = &spec.components[0];
        assert_eq!(hero.id, "hero");
        assert_eq!(hero.root_tag, "section");
        assert_eq!(hero.children[0], ComponentChild { tag: "h1".into(), content_hint: "主标题".into() });
        assert_eq!(hero.children[2], ComponentChild { tag: "div".into(), content_hint: "立即购买".into() });

        assert_eq!(spec.components[1].id, "component-2");
        assert_eq!(spec.components[1].children[0].content_hint, "footer");
    }

    #[test]
    fn test_task_plan_with_dependencies() {
        let raw = "Summary: Build the landing page\nTasks:\n- skeleton: HTML skeleton\n- hero: hero block (depends on: skeleton)\n- polish styles";
        let record = parse_heuristic(raw, RecordKind::TaskPlan, &[]);
        let plan = record.as_task_plan().unwrap();
        assert_eq!(plan.summary, "Build the landing page");
        assert_eq!(plan.tasks.len(), 3);
        assert_eq!(plan.tasks[1].id, "hero");
        assert_eq!(plan.tasks[1].description, "hero block");
        assert_eq!(plan.tasks[1].depends_on, vec!["skeleton"]);
        assert_eq!(plan.tasks[2].id, "task-3");
        assert_eq!(plan.tasks[2].description, "polish styles");
    }

    #[test]
    fn test_component_key_names_root_tag() {
        let raw = "Components:\n- hero (header): h1 Product name\n- promo（<aside>）: p Only today\n- gallery (photos): img Seeds";
        let record = parse_heuristic(raw, RecordKind::PageSpec, &[]);
        let spec = record.as_page_spec().unwrap();
        assert_eq!(spec.components[0].id, "hero");
        assert_eq!(spec.components[0].root_tag, "header");
        assert_eq!(spec.components[1].id, "promo");
        assert_eq!(spec.components[1].root_tag, "aside");
        // Not a tag: the parenthetical stays part of the id
        assert_eq!(spec.components[2].id, "gallery (photos)");
        assert_eq!(spec.components[2].root_tag, "section");
    }

    #[test]
    fn test_task_deliverable_note_in_either_order() {
        let raw = "Tasks:\n- hero: hero block (deliverable: hero.html)\n- story: write copy (depends on: hero) (deliverable: story copy)\n- 页脚：页脚模块（交付：footer.html）（依赖：hero）";
        let record = parse_heuristic(raw, RecordKind::TaskPlan, &[]);
        let plan = record.as_task_plan().unwrap();
        assert_eq!(plan.tasks[0].description, "hero block");
        assert_eq!(plan.tasks[0].deliverable.as_deref(), Some("hero.html"));
        assert!(plan.tasks[0].depends_on.is_empty());

        assert_eq!(plan.tasks[1].description, "write copy");
        assert_eq!(plan.tasks[1].depends_on, vec!["hero"]);
        assert_eq!(plan.tasks[1].deliverable.as_deref(), Some("story copy"));

        assert_eq!(plan.tasks[2].id, "页脚");
        assert_eq!(plan.tasks[2].description, "页脚模块");
        assert_eq!(plan.tasks[2].depends_on, vec!["hero"]);
        assert_eq!(plan.tasks[2].deliverable.as_deref(), Some("footer.html"));
    }

    #[test]
    fn test_role_plan_role_headings_and_task_lines() {
        let roster = vec!["TeamLeader".to_string(), "Engineer".to_string(), "PM".to_string()];
        let raw = "TeamLeader：\n- 梳理需求\n- 划分交付物\nEngineer：根据规格输出 HTML 页面\n任务：\n- pm: 撰写 PRD";
        let record = parse_heuristic(raw, RecordKind::RolePlan, &roster);
        let plan = record.as_role_plan().unwrap();
        assert_eq!(plan.tasks_for("TeamLeader").unwrap(), ["梳理需求", "划分交付物"]);
        assert_eq!(plan.tasks_for("Engineer").unwrap(), ["根据规格输出 HTML 页面"]);
        assert_eq!(plan.tasks_for("PM").unwrap(), ["撰写 PRD"]);
    }

    #[test]
    fn test_unrecognized_text_degrades_to_empty_lists() {
        let record = parse_heuristic("lorem ipsum\ndolor sit amet", RecordKind::PageSpec, &[]);
        let spec = record.as_page_spec().unwrap();
        assert_eq!(spec.layout, "lorem ipsum");
        assert!(spec.colors.is_empty());
        assert!(spec.components.is_empty());
    }
}
