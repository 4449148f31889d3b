//! Integration tests for the extraction pipeline against a scripted engine

use cpgmodel_api::{ClassType, ExtractError, ExtractResult, QueryEngine, QueryResponse};
use cpgmodel_java::emit::{self, END_OF_STREAM};
use cpgmodel_java::{ExtractConfig, Orchestrator, OutputFormat, RunContext};
use serde_json::{json, Value};
use std::path::Path;

/// Answers queries by substring rules (first match wins) and records every query
struct ScriptedEngine {
    rules: Vec<(String, QueryResponse)>,
    queries: Vec<String>,
}

impl ScriptedEngine {
    fn new() -> Self {
        Self {
            rules: Vec::new(),
            queries: Vec::new(),
        }
    }

    fn on(mut self, needle: impl Into<String>, response: QueryResponse) -> Self {
        self.rules.push((needle.into(), response));
        self
    }

    /// Import, cleanup and inventory answered successfully
    fn project() -> Self {
        Self::new()
            .on("importCode(", QueryResponse::ok("val res0: Cpg = Cpg[Graph]"))
            .on("delete(", QueryResponse::ok("val res9: Unit = ()"))
            .on("t.ast.size", payload(inventory()))
    }

    fn count(&self, needle: &str) -> usize {
        self.queries.iter().filter(|q| q.contains(needle)).count()
    }
}

impl QueryEngine for ScriptedEngine {
    fn execute(&mut self, query: &str) -> ExtractResult<QueryResponse> {
        self.queries.push(query.to_string());
        let response = self
            .rules
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| QueryResponse::failed(format!("unscripted query: {query}")));
        Ok(response)
    }
}

const ALL_CLASSES: &str = "map(t => (t.name";

fn payload(value: Value) -> QueryResponse {
    QueryResponse::ok(format!(
        "val res1: String = \"\"\"{}\"\"\"\n",
        serde_json::to_string_pretty(&value).unwrap()
    ))
}

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/bank")
        .join(name)
        .display()
        .to_string()
}

fn inventory() -> Value {
    json!([
        {"_1": "com.acme.bank.Account", "_2": 100, "_3": 50},
        {"_1": "com.acme.bank.Status", "_2": 30, "_3": 10},
        {"_1": "com.acme.bank.Plugin", "_2": 10, "_3": 5},
        {"_1": "com.acme.bank.SavingsAccount", "_2": 80, "_3": 40}
    ])
}

fn attr(name: &str, type_full_name: &str, line: usize, modifiers: &[&str]) -> Value {
    json!({"_1": name, "_2": type_full_name, "_3": line, "_4": modifiers})
}

fn instr(label: &str, code: &str, line: usize, calls: &[&str]) -> Value {
    json!({"_1": label, "_2": code, "_3": line, "_4": calls})
}

fn method(
    name: &str,
    code: &str,
    lines: (usize, usize),
    modifiers: &[&str],
    params: &[(&str, usize)],
    instructions: Option<Vec<Value>>,
) -> Value {
    let params: Vec<Value> = params
        .iter()
        .map(|(code, index)| json!({"_1": code, "_2": index}))
        .collect();
    let mut m = json!({
        "_1": name, "_2": code, "_3": lines.0, "_4": lines.1, "_5": modifiers, "_6": params
    });
    if let Some(instructions) = instructions {
        m["_7"] = json!(instructions);
    }
    m
}

fn default_constructor(visibility: &str) -> Value {
    json!({"_1": "<init>", "_2": "<empty>", "_5": ["CONSTRUCTOR", visibility], "_6": []})
}

fn account_constructor_instructions() -> Vec<Value> {
    vec![instr("CALL", "this.owner = owner", 12, &["<operator>.assignment"])]
}

fn deposit_instructions() -> Vec<Value> {
    vec![
        instr("CALL", "balance += amount", 16, &["<operator>.assignmentPlus"]),
        instr(
            "CALL",
            "history.add(\"deposit\")",
            17,
            &["java.util.List.add:boolean(java.lang.Object)"],
        ),
    ]
}

fn get_balance_instructions() -> Vec<Value> {
    vec![instr("RETURN", "return balance;", 21, &[])]
}

fn account(inline: bool) -> Value {
    let inline_only = |instructions: Vec<Value>| inline.then_some(instructions);
    json!({
        "_1": "Account",
        "_2": "com.acme.bank.Account",
        "_3": ["java.lang.Object"],
        "_4": "public class Account",
        "_5": 6,
        "_6": [
            attr("owner", "java.lang.String", 7, &["PRIVATE", "FINAL"]),
            attr("balance", "int", 8, &["PROTECTED"]),
            attr("history", "java.util.List", 9, &[])
        ],
        "_7": fixture("Account.java"),
        "_8": [
            method("<init>", "public Account(String owner)", (11, 13),
                &["CONSTRUCTOR", "PUBLIC"], &[("String owner", 1)],
                inline_only(account_constructor_instructions())),
            method("deposit", "public void deposit(int amount)", (15, 18),
                &["PUBLIC"], &[("int amount", 1)], inline_only(deposit_instructions())),
            method("getBalance", "public int getBalance()", (20, 22),
                &["PUBLIC"], &[], inline_only(get_balance_instructions()))
        ]
    })
}

fn savings_account() -> Value {
    json!({
        "_1": "SavingsAccount",
        "_2": "com.acme.bank.SavingsAccount",
        "_3": ["com.acme.bank.Account"],
        "_4": "public class SavingsAccount extends Account",
        "_5": 3,
        "_6": [attr("rate", "double", 4, &["PRIVATE"])],
        "_7": fixture("SavingsAccount.java"),
        "_8": [
            method("<init>", "public SavingsAccount(String owner, double rate)", (6, 9),
                &["CONSTRUCTOR", "PUBLIC"], &[("double rate", 2), ("String owner", 1)],
                Some(vec![
                    instr("CALL", "super(owner)", 7,
                        &["com.acme.bank.Account.<init>:void(java.lang.String)"]),
                    instr("CALL", "this.rate = rate", 8, &["<operator>.assignment"])
                ])),
            method("addInterest", "public void addInterest()", (11, 13), &["PUBLIC"], &[],
                Some(vec![instr("CALL", "deposit((int) (getBalance() * rate))", 12, &[
                    "com.acme.bank.Account.deposit:void(int)",
                    "com.acme.bank.Account.getBalance:int()",
                    "<operator>.multiplication",
                    "<operator>.cast"
                ])]))
        ]
    })
}

fn status() -> Value {
    json!({
        "_1": "Status",
        "_2": "com.acme.bank.Status",
        "_3": ["java.lang.Enum"],
        "_4": "public enum Status",
        "_5": 3,
        "_6": [
            attr("OPEN", "com.acme.bank.Status", 4, &["PUBLIC", "STATIC", "FINAL"]),
            attr("CLOSED", "com.acme.bank.Status", 5, &["PUBLIC", "STATIC", "FINAL"])
        ],
        "_7": fixture("Status.java"),
        "_8": [default_constructor("PRIVATE")]
    })
}

fn plugin() -> Value {
    json!({
        "_1": "Plugin",
        "_2": "com.acme.bank.Plugin",
        "_3": ["org.external.Base"],
        "_4": "public class Plugin extends org.external.Base",
        "_5": 3,
        "_6": [],
        "_7": fixture("Plugin.java"),
        "_8": [default_constructor("PUBLIC")]
    })
}

fn all_classes() -> Value {
    json!([account(true), savings_account(), status(), plugin()])
}

fn class_rule(full_name: &str) -> String {
    format!("fullNameExact(\"{full_name}\").map")
}

/// Engine for the per-class path; Account is the only class deferred under
/// `large_config`
fn large_project() -> ScriptedEngine {
    ScriptedEngine::new()
        .on(class_rule("com.acme.bank.Plugin"), payload(json!([plugin()])))
        .on(class_rule("com.acme.bank.Status"), payload(json!([status()])))
        .on(
            class_rule("com.acme.bank.SavingsAccount"),
            payload(json!([savings_account()])),
        )
        .on(
            class_rule("com.acme.bank.Account"),
            payload(json!([account(false)])),
        )
}

fn large_config() -> ExtractConfig {
    ExtractConfig::default()
        .with_small_project_ast_size(200)
        .with_inline_limits(90, 45)
}

fn run(
    engine: &mut ScriptedEngine,
    config: ExtractConfig,
) -> (ExtractResult<()>, RunContext<&mut ScriptedEngine>) {
    let orchestrator = Orchestrator::new(config);
    let mut ctx = RunContext::new(engine);
    let result = orchestrator.run(&mut ctx, "/work/bank", "cpgmodel-test");
    (result, ctx)
}

#[test]
fn test_small_project_single_aggregate_query() {
    let mut engine =
        ScriptedEngine::project().on(ALL_CLASSES, payload(all_classes()));
    let (result, ctx) = run(&mut engine, ExtractConfig::default());
    result.unwrap();

    assert!(ctx.metrics.small_project);
    assert_eq!(ctx.metrics.classes_inventoried, 4);
    assert_eq!(ctx.metrics.classes_built, 4);
    assert_eq!(ctx.metrics.classes_filtered, 1);
    assert_eq!(ctx.metrics.queries_issued, 4);
    assert_eq!(ctx.metrics.deferred_queries(), 0);

    let names: Vec<&str> = ctx.classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Account", "SavingsAccount", "Status"]);
    drop(ctx);

    assert_eq!(engine.count(ALL_CLASSES), 1);
    assert!(engine.queries[0].starts_with("importCode(inputPath=\"/work/bank\""));
    assert_eq!(engine.queries[3], "delete(\"cpgmodel-test\")");
}

#[test]
fn test_account_is_fully_normalized() {
    let mut engine =
        ScriptedEngine::project().on(ALL_CLASSES, payload(all_classes()));
    let (result, ctx) = run(&mut engine, ExtractConfig::default());
    result.unwrap();
    let account = &ctx.classes[0];

    assert_eq!(account.class_type, ClassType::Class);
    assert_eq!(account.class_full_name, "Account");
    assert_eq!(account.package_name, "com.acme.bank");
    assert_eq!(account.code, "public class Account");
    assert_eq!(account.modifiers.as_slice(), &["public"]);
    assert_eq!(account.import_statements.len(), 2);
    assert_eq!(account.file_length, 23);
    assert_eq!(account.empty_lines, 5);
    assert_eq!(account.non_empty_lines, 18);
    assert!(account.inherits_from.is_empty());

    let owner = &account.attributes[0];
    assert_eq!(owner.attribute_type, "String");
    assert_eq!(owner.package_name, "java.lang");
    assert_eq!(owner.modifiers.as_slice(), &["private", "final"]);
    assert_eq!(owner.code, "private final String owner;");

    let history = &account.attributes[2];
    assert_eq!(history.attribute_type, "List<String>");
    assert_eq!(history.modifiers.as_slice(), &["package private"]);

    let ctor = &account.methods[0];
    assert_eq!(ctor.name, "Account");
    assert_eq!(ctor.method_body, "Account(String owner)");
    assert_eq!(ctor.return_type, "");
    assert_eq!(ctor.parameters[0].parameter_type, "String");

    let deposit = &account.methods[1];
    assert_eq!(deposit.return_type, "void");
    assert_eq!(deposit.total_method_length, 4);
    assert_eq!(deposit.instructions.len(), 2);
    assert!(deposit.instructions.iter().all(|i| i.method_call.is_empty()));
    assert!(deposit.method_calls.is_empty());
}

#[test]
fn test_calls_resolve_to_project_methods() {
    let mut engine =
        ScriptedEngine::project().on(ALL_CLASSES, payload(all_classes()));
    let (result, ctx) = run(&mut engine, ExtractConfig::default());
    result.unwrap();
    let savings = &ctx.classes[1];

    assert_eq!(savings.inherits_from, vec!["Account"]);
    let ctor = &savings.methods[0];
    assert_eq!(ctor.name, "SavingsAccount");
    assert_eq!(ctor.parameters[0].name, "owner");
    assert_eq!(ctor.parameters[1].name, "rate");
    assert_eq!(ctor.instructions[0].method_call, "Account.Account");
    assert_eq!(ctor.instructions[1].method_call, "");

    let add_interest = &savings.methods[1];
    assert_eq!(add_interest.instructions[0].method_call, "Account.deposit");
}

#[test]
fn test_enum_constants_and_default_constructor() {
    let mut engine =
        ScriptedEngine::project().on(ALL_CLASSES, payload(all_classes()));
    let (result, ctx) = run(&mut engine, ExtractConfig::default());
    result.unwrap();
    let status = &ctx.classes[2];

    assert_eq!(status.class_type, ClassType::Enum);
    for constant in &status.attributes {
        assert_eq!(constant.attribute_type, "Status");
        assert_eq!(constant.modifiers.as_slice(), &["public", "final", "static"]);
    }

    let ctor = &status.methods[0];
    assert_eq!(ctor.name, "Status");
    assert_eq!(ctor.method_body, "Status()");
    assert_eq!(ctor.return_type, "");
    assert_eq!(ctor.total_method_length, 0);
    assert_eq!(ctor.modifiers.as_slice(), &["private"]);
}

#[test]
fn test_large_project_queries_per_class_smallest_first() {
    let mut engine = large_project()
        .on(
            "fullNameExact(\"com.acme.bank.Account\").method.filterNot",
            payload(json!([
                {"_1": "<init>", "_2": 11, "_3": account_constructor_instructions()},
                {"_1": "deposit", "_2": 15, "_3": deposit_instructions()},
                {"_1": "getBalance", "_2": 20, "_3": get_balance_instructions()}
            ])),
        )
        .on("importCode(", QueryResponse::ok("ok"))
        .on("delete(", QueryResponse::ok("ok"))
        .on("t.ast.size", payload(inventory()));

    let (result, ctx) = run(&mut engine, large_config());
    result.unwrap();

    assert!(!ctx.metrics.small_project);
    assert_eq!(ctx.metrics.deferred_class_queries, 1);
    assert_eq!(ctx.metrics.deferred_method_queries, 0);
    assert_eq!(ctx.metrics.queries_issued, 8);

    let account = ctx.classes.iter().find(|c| c.name == "Account").unwrap();
    assert_eq!(account.methods[0].instructions.len(), 1);
    assert_eq!(account.methods[1].instructions.len(), 2);
    assert_eq!(account.methods[2].instructions[0].label, "RETURN");
    drop(ctx);

    assert_eq!(engine.count(ALL_CLASSES), 4);
    let class_order: Vec<usize> = [
        "com.acme.bank.Plugin",
        "com.acme.bank.Status",
        "com.acme.bank.SavingsAccount",
        "com.acme.bank.Account",
    ]
    .iter()
    .map(|name| {
        let needle = class_rule(name);
        engine.queries.iter().position(|q| q.contains(&needle)).unwrap()
    })
    .collect();
    assert_eq!(class_order, vec![2, 3, 4, 5]);

    // Only the deferred class leaves instructions out of its class query
    assert!(!engine.queries[5].contains("isCfgNode"));
    assert!(engine.queries[4].contains("isCfgNode"));
}

#[test]
fn test_large_class_instructions_fetched_per_method() {
    let one = |name: &str, line: usize, instructions: Vec<Value>| {
        payload(json!([{"_1": name, "_2": line, "_3": instructions}]))
    };
    let mut engine = large_project()
        .on(
            ".method.lineNumber(11)",
            one("<init>", 11, account_constructor_instructions()),
        )
        .on(".method.lineNumber(15)", one("deposit", 15, deposit_instructions()))
        .on(
            ".method.lineNumber(20)",
            one("getBalance", 20, get_balance_instructions()),
        )
        .on("importCode(", QueryResponse::ok("ok"))
        .on("delete(", QueryResponse::ok("ok"))
        .on("t.ast.size", payload(inventory()));

    let (result, ctx) = run(&mut engine, large_config().with_class_instruction_lines(5));
    result.unwrap();

    assert_eq!(ctx.metrics.deferred_class_queries, 0);
    assert_eq!(ctx.metrics.deferred_method_queries, 3);
    let account = ctx.classes.iter().find(|c| c.name == "Account").unwrap();
    assert_eq!(account.methods[1].instructions.len(), 2);
    drop(ctx);

    // Shortest method first, ties in source order
    let lines: Vec<&str> = engine
        .queries
        .iter()
        .filter_map(|q| q.split(".method.lineNumber(").nth(1))
        .map(|rest| rest.split(')').next().unwrap())
        .collect();
    assert_eq!(lines, vec!["11", "20", "15"]);
}

fn ledger() -> Value {
    json!({
        "_1": "Ledger",
        "_2": "com.acme.bank.Ledger",
        "_3": ["java.lang.Object"],
        "_4": "public abstract class Ledger",
        "_5": 3,
        "_6": [],
        "_7": fixture("Ledger.java"),
        "_8": [
            default_constructor("PUBLIC"),
            method("size", "public abstract int size()", (4, 4),
                &["ABSTRACT", "PUBLIC"], &[], None),
            method("checksum", "protected native long checksum()", (6, 6),
                &["NATIVE", "PROTECTED"], &[], None),
            method("record", "public void record(int amount)", (8, 10),
                &["PUBLIC"], &[("int amount", 1)], None)
        ]
    })
}

#[test]
fn test_per_method_pass_skips_bodiless_methods() {
    let record_instructions = vec![instr(
        "CALL",
        "System.out.println(amount)",
        9,
        &["java.io.PrintStream.println:void(int)"],
    )];
    // Any query for another method line falls through to an unscripted failure
    let mut engine = ScriptedEngine::new()
        .on(
            ".method.lineNumber(8)",
            payload(json!([{"_1": "record", "_2": 8, "_3": record_instructions}])),
        )
        .on(class_rule("com.acme.bank.Ledger"), payload(json!([ledger()])))
        .on("importCode(", QueryResponse::ok("ok"))
        .on("delete(", QueryResponse::ok("ok"))
        .on(
            "t.ast.size",
            payload(json!([{"_1": "com.acme.bank.Ledger", "_2": 300, "_3": 120}])),
        );

    let (result, ctx) = run(&mut engine, large_config().with_class_instruction_lines(1));
    result.unwrap();

    assert_eq!(ctx.metrics.deferred_class_queries, 0);
    assert_eq!(ctx.metrics.deferred_method_queries, 1);
    let ledger = &ctx.classes[0];
    assert_eq!(ledger.class_type, ClassType::AbstractClass);
    for method in &ledger.methods {
        match method.name.as_str() {
            "record" => assert_eq!(method.instructions.len(), 1),
            "Ledger" => {
                assert_eq!(method.total_method_length, 0);
                assert!(method.instructions.is_empty());
            }
            "size" | "checksum" => {
                assert!(!method.has_body());
                assert!(method.instructions.is_empty());
            }
            other => panic!("unexpected method {other}"),
        }
    }
    drop(ctx);

    assert_eq!(engine.count(".method.lineNumber("), 1);
    assert_eq!(engine.count(".method.lineNumber(0)"), 0);
}

#[test]
fn test_query_failure_is_fatal_and_still_cleans_up() {
    let mut engine = ScriptedEngine::project().on(
        ALL_CLASSES,
        QueryResponse::failed("-- [E008] Not Found Error: value typeDecls"),
    );
    let (result, ctx) = run(&mut engine, ExtractConfig::default());

    match result.unwrap_err() {
        ExtractError::Query { stderr, .. } => assert!(stderr.contains("Not Found Error")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(ctx.classes.is_empty());
    drop(ctx);
    assert!(engine.queries.last().unwrap().starts_with("delete("));
}

#[test]
fn test_import_failure() {
    let mut engine = ScriptedEngine::new()
        .on("importCode(", QueryResponse::failed("No such directory"))
        .on("delete(", QueryResponse::ok("ok"));
    let (result, ctx) = run(&mut engine, ExtractConfig::default());

    let err = result.unwrap_err();
    assert!(matches!(err, ExtractError::Import { .. }));
    assert_eq!(err.engine_stderr(), Some("No such directory"));
    drop(ctx);
    assert_eq!(engine.queries.len(), 2);
}

#[test]
fn test_blank_result_is_fatal() {
    let mut engine = ScriptedEngine::project().on(ALL_CLASSES, QueryResponse::ok("  \n"));
    let (result, _ctx) = run(&mut engine, ExtractConfig::default());
    assert!(matches!(result.unwrap_err(), ExtractError::EmptyResult { .. }));
}

#[test]
fn test_unquoted_result_is_decode_error() {
    let mut engine =
        ScriptedEngine::project().on(ALL_CLASSES, QueryResponse::ok("val res1: Int = 0"));
    let (result, _ctx) = run(&mut engine, ExtractConfig::default());
    assert!(matches!(result.unwrap_err(), ExtractError::Decode(_)));
}

#[test]
fn test_only_external_classes_is_no_classes() {
    let mut engine = ScriptedEngine::project().on(ALL_CLASSES, payload(json!([plugin()])));
    let (result, ctx) = run(&mut engine, ExtractConfig::default());
    assert!(matches!(result.unwrap_err(), ExtractError::NoClasses));
    assert_eq!(ctx.metrics.classes_filtered, 1);
}

#[test]
fn test_empty_source_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Empty.java");
    std::fs::write(&path, "").unwrap();

    let mut class = plugin();
    class["_7"] = json!(path.display().to_string());
    let mut engine = ScriptedEngine::project().on(ALL_CLASSES, payload(json!([class])));
    let (result, _ctx) = run(&mut engine, ExtractConfig::default());
    assert!(matches!(result.unwrap_err(), ExtractError::EmptySource(_)));
}

#[test]
fn test_cleanup_failure_does_not_fail_run() {
    let mut engine = ScriptedEngine::new()
        .on("importCode(", QueryResponse::ok("ok"))
        .on("delete(", QueryResponse::failed("project not found"))
        .on("t.ast.size", payload(inventory()))
        .on(ALL_CLASSES, payload(all_classes()));
    let (result, ctx) = run(&mut engine, ExtractConfig::default());
    assert!(result.is_ok());
    assert_eq!(ctx.classes.len(), 3);
}

#[test]
fn test_extracted_classes_frame_as_literals() {
    let mut engine =
        ScriptedEngine::project().on(ALL_CLASSES, payload(all_classes()));
    let (result, ctx) = run(&mut engine, ExtractConfig::default());
    result.unwrap();

    let mut out = Vec::new();
    emit::emit_classes(&mut out, &ctx.classes, OutputFormat::Literal).unwrap();

    let mut offset = 0;
    let mut frames = Vec::new();
    loop {
        let len = i32::from_ne_bytes(out[offset..offset + 4].try_into().unwrap());
        offset += 4;
        if len == END_OF_STREAM {
            break;
        }
        let end = offset + len as usize;
        frames.push(String::from_utf8(out[offset..end].to_vec()).unwrap());
        offset = end;
    }

    assert_eq!(frames.len(), 3);
    assert!(frames[0].starts_with("{'name': 'Account', 'code': 'public class Account'"));
    assert!(frames[0].contains("'code': 'history.add(\"deposit\")'"));
    assert!(frames[2].contains("'classType': 'enum'"));
}
