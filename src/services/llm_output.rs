//! LLM 输出解析
//!
//! 模型常常在 JSON 外面包一层 Markdown 代码块或解释文字，这里负责把 JSON 取出来。

use crate::error::LlmError;
use crate::models::QuestionDraft;
use regex::Regex;
use serde_json::Value as JsonValue;

/// 从 LLM 输出中提取 JSON
///
/// 依次尝试：```json 代码块、整段文本、最外层的 `[...]` 或 `{...}`。
pub fn extract_json(output: &str) -> Result<JsonValue, LlmError> {
    if let Ok(re) = Regex::new(r"(?s)```(?:json)?\s*(.*?)```") {
        for caps in re.captures_iter(output) {
            if let Some(body) = caps.get(1) {
                if let Ok(value) = serde_json::from_str(body.as_str().trim()) {
                    return Ok(value);
                }
            }
        }
    }

    let trimmed = output.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    for (open, close) in [('[', ']'), ('{', '}')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str(&trimmed[start..=end]) {
                    return Ok(value);
                }
            }
        }
    }

    Err(LlmError::malformed("无法从输出中提取 JSON", output))
}

/// 解析问题列表：字符串数组，或带 `question` 字段的对象数组
pub fn parse_question_list(output: &str) -> Result<Vec<String>, LlmError> {
    let JsonValue::Array(items) = extract_json(output)? else {
        return Err(LlmError::malformed("问题列表不是 JSON 数组", output));
    };

    let questions: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            JsonValue::String(s) => Some(s.trim().to_string()),
            JsonValue::Object(map) => map
                .get("question")
                .and_then(JsonValue::as_str)
                .map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|q| !q.is_empty())
        .collect();

    if questions.is_empty() {
        return Err(LlmError::malformed("问题列表为空", output));
    }
    Ok(questions)
}

/// 解析打标签结果
pub fn parse_labeled_questions(output: &str) -> Result<Vec<QuestionDraft>, LlmError> {
    let value = extract_json(output)?;
    let drafts: Vec<QuestionDraft> = serde_json::from_value(value)
        .map_err(|e| LlmError::malformed(format!("标签结果格式错误: {}", e), output))?;
    Ok(drafts
        .into_iter()
        .filter(|d| !d.question.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_from_fenced_block() {
        let output = "好的，结果如下：\n```json\n[\"a\", \"b\"]\n```\n希望有帮助";
        assert_eq!(extract_json(output).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn extracts_outermost_span_from_prose() {
        let output = "Here you go: [{\"question\": \"q1\", \"label\": \"x\"}] done.";
        assert_eq!(
            extract_json(output).unwrap(),
            json!([{"question": "q1", "label": "x"}])
        );
    }

    #[test]
    fn malformed_output_is_an_error() {
        assert!(matches!(
            extract_json("no json here"),
            Err(LlmError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn question_list_accepts_strings_and_objects() {
        assert_eq!(
            parse_question_list("[\"q1\", {\"question\": \"q2\"}, 3, \"  \"]").unwrap(),
            vec!["q1", "q2"]
        );
        assert!(parse_question_list("[]").is_err());
        assert!(parse_question_list("{\"question\": \"q\"}").is_err());
    }

    #[test]
    fn labeled_questions_tolerate_missing_label() {
        let drafts = parse_labeled_questions("[{\"question\": \"q1\"}, {\"question\": \"q2\", \"label\": \"史\"}]").unwrap();
        assert_eq!(drafts[0].label, None);
        assert_eq!(drafts[1].label.as_deref(), Some("史"));
    }
}
