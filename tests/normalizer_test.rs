//! Integration tests for the output normalizer
//!
//! The same logical content is fed once as JSON and once as loose
//! sectioned text; both must produce the same record.

use agentbus::models::{
    Component, ComponentChild, PageSection, PageSpec, Prd, RecordKind, StructuredRecord, TaskItem,
    TaskPlan, NO_TASK,
};
use agentbus::parser::{normalize, Diagnostic, NormalizeError, Phase};

fn roster(roles: &[&str]) -> Vec<String> {
    roles.iter().map(|r| r.to_string()).collect()
}

#[test]
fn test_requirements_strict_and_heuristic_agree() {
    let json = r#"{
        "product": "Sunflower seeds",
        "goals": ["Lift conversion", "Holiday mood"],
        "target_users": ["Families", "Office snackers"],
        "page_sections": [
            {"id": "hero", "purpose": "Headline and price", "success_metric": "CTR"},
            {"id": "story", "purpose": "Origin story"}
        ]
    }"#;
    let text = "\
# Product: Sunflower seeds

## Goals
- Lift conversion
- Holiday mood

**Target Users**
1. Families
2. Office snackers

Page Sections:
- hero: Headline and price (metric: CTR)
- story: Origin story
";

    let strict = normalize(json, RecordKind::Requirements, &[]).unwrap();
    let heuristic = normalize(text, RecordKind::Requirements, &[]).unwrap();
    assert_eq!(strict.phase, Phase::Strict);
    assert_eq!(heuristic.phase, Phase::Heuristic);
    assert_eq!(strict.record, heuristic.record);

    let expected = Prd {
        product: "Sunflower seeds".to_string(),
        goals: vec!["Lift conversion".to_string(), "Holiday mood".to_string()],
        target_users: vec!["Families".to_string(), "Office snackers".to_string()],
        page_sections: vec![
            PageSection {
                id: "hero".to_string(),
                purpose: "Headline and price".to_string(),
                success_metric: Some("CTR".to_string()),
            },
            PageSection {
                id: "story".to_string(),
                purpose: "Origin story".to_string(),
                success_metric: None,
            },
        ],
    };
    assert_eq!(strict.record, StructuredRecord::Requirements(expected));
}

#[test]
fn test_page_spec_strict_and_heuristic_agree() {
    let json = r#"{
        "layout": "single column",
        "colors": ["red", "gold"],
        "components": [{
            "id": "hero",
            "html": "header",
            "children": [
                {"tag": "h1", "content_hint": "Product name"},
                {"tag": "p", "content_hint": "Price 19.9"}
            ]
        }]
    }"#;
    let text = "Layout: single column\nColors: red, gold\nComponents:\n- hero (header): h1 Product name, p Price 19.9";

    let strict = normalize(json, RecordKind::PageSpec, &[]).unwrap();
    let heuristic = normalize(text, RecordKind::PageSpec, &[]).unwrap();
    assert_eq!(strict.phase, Phase::Strict);
    assert_eq!(heuristic.phase, Phase::Heuristic);
    assert_eq!(strict.record, heuristic.record);

    let expected = PageSpec {
        layout: "single column".to_string(),
        colors: vec!["red".to_string(), "gold".to_string()],
        components: vec![Component {
            id: "hero".to_string(),
            root_tag: "header".to_string(),
            children: vec![
                ComponentChild {
                    tag: "h1".to_string(),
                    content_hint: "Product name".to_string(),
                },
                ComponentChild {
                    tag: "p".to_string(),
                    content_hint: "Price 19.9".to_string(),
                },
            ],
        }],
    };
    assert_eq!(strict.record, StructuredRecord::PageSpec(expected));
}

#[test]
fn test_task_plan_strict_and_heuristic_agree() {
    let json = r#"{
        "summary": "Ship the landing page",
        "tasks": [
            {"id": "hero", "description": "Build the hero block", "deliverable": "hero.html"},
            {"id": "story", "description": "Write the story", "depends_on": ["hero"], "deliverable": "story copy"}
        ]
    }"#;
    let text = "\
Summary: Ship the landing page
Tasks:
- hero: Build the hero block (deliverable: hero.html)
- story: Write the story (depends on: hero) (deliverable: story copy)
";

    let strict = normalize(json, RecordKind::TaskPlan, &[]).unwrap();
    let heuristic = normalize(text, RecordKind::TaskPlan, &[]).unwrap();
    assert_eq!(strict.phase, Phase::Strict);
    assert_eq!(heuristic.phase, Phase::Heuristic);
    assert_eq!(strict.record, heuristic.record);

    let plan = strict.record.as_task_plan().unwrap();
    assert_eq!(plan.tasks[0].deliverable.as_deref(), Some("hero.html"));
    assert_eq!(plan.tasks[1].depends_on, vec!["hero"]);
    assert_eq!(plan.tasks[1].deliverable.as_deref(), Some("story copy"));
}

#[test]
fn test_payload_with_key_and_alias_stays_strict() {
    let normalized = normalize(
        r#"{"product":"瓜子","title":"春节礼盒","goals":["提升转化"]}"#,
        RecordKind::Requirements,
        &[],
    )
    .unwrap();
    assert_eq!(normalized.phase, Phase::Strict);
    let prd = normalized.record.as_prd().unwrap();
    assert_eq!(prd.product, "瓜子");
    assert_eq!(prd.goals, vec!["提升转化"]);

    let normalized = normalize(
        r#"{"summary":"s","tasks":[{"id":"a"},{"id":"b","depends_on":["a"],"dependsOn":["a"]}]}"#,
        RecordKind::TaskPlan,
        &[],
    )
    .unwrap();
    assert_eq!(normalized.phase, Phase::Strict);
    // The entry carrying both dependency keys is kept, not dropped
    assert_eq!(normalized.record.as_task_plan().unwrap().tasks.len(), 2);
}

#[test]
fn test_chinese_requirements_scenario() {
    let normalized = normalize("产品：瓜子\n目标：\n- 提升转化", RecordKind::Requirements, &[]).unwrap();
    let prd = normalized.record.as_prd().unwrap();
    assert_eq!(prd.product, "瓜子");
    assert_eq!(prd.goals, vec!["提升转化"]);
    assert!(prd.target_users.is_empty());
    assert!(prd.page_sections.is_empty());
}

#[test]
fn test_page_spec_colors_and_components() {
    let text = "布局：单列长页\n配色：红色、金色\n组件：\n- hero：h1 新疆葵花籽，p 19.9 元\n- 倒计时横幅";
    let normalized = normalize(text, RecordKind::PageSpec, &[]).unwrap();
    let spec: &PageSpec = normalized.record.as_page_spec().unwrap();

    assert_eq!(spec.layout, "单列长页");
    assert_eq!(spec.colors, vec!["红色", "金色"]);
    assert_eq!(spec.components.len(), 2);
    assert_eq!(spec.components[0].id, "hero");
    assert_eq!(spec.components[0].root_tag, "section");
    assert_eq!(spec.components[0].children[0].tag, "h1");
    assert_eq!(spec.components[0].children[0].content_hint, "新疆葵花籽");
    assert_eq!(spec.components[0].children[1].tag, "p");
    assert_eq!(spec.components[1].id, "component-2");
    assert_eq!(spec.components[1].children[0].tag, "div");
    assert_eq!(spec.components[1].children[0].content_hint, "倒计时横幅");
}

#[test]
fn test_task_plan_strict_aliases_and_repair() {
    let json = r#"{
        "summary": "Ship it",
        "prioritized_tasks": [
            {"id": "a", "description": "Scaffold"},
            {"description": "Style", "dependsOn": ["a", "a", "zzz"]}
        ]
    }"#;
    let normalized = normalize(json, RecordKind::TaskPlan, &[]).unwrap();
    let plan: &TaskPlan = normalized.record.as_task_plan().unwrap();

    assert_eq!(
        plan.tasks[1],
        TaskItem {
            id: "task-2".to_string(),
            description: "Style".to_string(),
            depends_on: vec!["a".to_string(), "zzz".to_string()],
            deliverable: None,
        }
    );
    assert_eq!(
        normalized.diagnostics,
        vec![Diagnostic::DanglingDependency {
            task: "task-2".to_string(),
            dependency: "zzz".to_string()
        }]
    );
}

#[test]
fn test_role_plan_back_fill() {
    let json = r#"{"available_roles":["A","B","C"],"tasks":[{"role":"A","tasks":["x"]}]}"#;
    let normalized = normalize(json, RecordKind::RolePlan, &[]).unwrap();
    let plan = normalized.record.as_role_plan().unwrap();

    assert_eq!(plan.tasks_for("A"), Some(&["x".to_string()][..]));
    assert_eq!(plan.tasks_for("B"), Some(&[NO_TASK.to_string()][..]));
    assert_eq!(plan.tasks_for("C"), Some(&[NO_TASK.to_string()][..]));
}

#[test]
fn test_role_plan_heuristic_with_roster() {
    let text = "TeamLeader:\n- 拆分需求\n- 跟进进度\nEngineer：实现页面";
    let normalized = normalize(text, RecordKind::RolePlan, &roster(&["TeamLeader", "Engineer", "PM"]))
        .unwrap();
    let plan = normalized.record.as_role_plan().unwrap();

    assert_eq!(normalized.phase, Phase::Heuristic);
    assert_eq!(plan.available_roles, vec!["TeamLeader", "Engineer", "PM"]);
    assert_eq!(
        plan.tasks_for("TeamLeader"),
        Some(&["拆分需求".to_string(), "跟进进度".to_string()][..])
    );
    assert_eq!(plan.tasks_for("Engineer"), Some(&["实现页面".to_string()][..]));
    assert_eq!(plan.tasks_for("PM"), Some(&[NO_TASK.to_string()][..]));
}

#[test]
fn test_unknown_role_is_added_with_diagnostic() {
    let json = r#"{"available_roles":["A"],"tasks":[{"role":"Z","tasks":["late"]}]}"#;
    let normalized = normalize(json, RecordKind::RolePlan, &[]).unwrap();
    let plan = normalized.record.as_role_plan().unwrap();

    assert_eq!(plan.available_roles, vec!["A", "Z"]);
    assert!(normalized
        .diagnostics
        .contains(&Diagnostic::RoleConsistencyViolation { role: "Z".to_string() }));
}

#[test]
fn test_missing_sections_default_to_empty() {
    for _ in 0..2 {
        let normalized = normalize("Just a title line", RecordKind::Requirements, &[]).unwrap();
        let prd = normalized.record.as_prd().unwrap();
        assert_eq!(prd.product, "Just a title line");
        assert_eq!(prd.goals, Vec::<String>::new());
        assert_eq!(prd.target_users, Vec::<String>::new());
        assert_eq!(prd.page_sections, Vec::<PageSection>::new());
    }
}

#[test]
fn test_whitespace_output_is_malformed() {
    let err = normalize(" \n\t ", RecordKind::PageSpec, &[]).unwrap_err();
    assert!(matches!(
        err,
        NormalizeError::MalformedOutput {
            kind: RecordKind::PageSpec,
            ..
        }
    ));
}
