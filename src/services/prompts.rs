//! 提示词
//!
//! 每个生成步骤一个构建函数，按语言选择中文或英文模板。

use crate::config::Language;

/// 从文本中抽取问题
pub fn question_prompt(language: Language, text: &str, number: usize) -> String {
    match language {
        Language::Zh => format!(
            "# 角色：文本问题构建专家\n\
             请根据下面的文本，生成 {number} 个高质量问题。\n\
             要求：\n\
             1. 问题必须能从文本中找到答案，不要出现“根据文本”之类的表述；\n\
             2. 覆盖文本的不同方面，避免重复；\n\
             3. 只输出 JSON 字符串数组，例如 [\"问题1\", \"问题2\"]。\n\n\
             ## 文本\n{text}\n"
        ),
        Language::En => format!(
            "# Role: Question Generation Expert\n\
             Generate {number} high-quality questions from the text below.\n\
             Requirements:\n\
             1. Each question must be answerable from the text; never mention \"the text\";\n\
             2. Cover different aspects of the text without repetition;\n\
             3. Output only a JSON array of strings, e.g. [\"Question 1\", \"Question 2\"].\n\n\
             ## Text\n{text}\n"
        ),
    }
}

/// 为问题打标签
pub fn label_prompt(language: Language, tags_json: &str, questions_json: &str) -> String {
    match language {
        Language::Zh => format!(
            "# 角色：问题分类专家\n\
             请从标签列表中为每个问题选择最合适的一个标签。\n\
             只输出 JSON 数组，每项形如 {{\"question\": \"问题\", \"label\": \"标签\"}}，问题原样保留。\n\n\
             ## 标签列表\n{tags_json}\n\n## 问题列表\n{questions_json}\n"
        ),
        Language::En => format!(
            "# Role: Question Classification Expert\n\
             Pick the single most suitable label from the label list for each question.\n\
             Output only a JSON array whose items look like {{\"question\": \"...\", \"label\": \"...\"}}; keep questions verbatim.\n\n\
             ## Labels\n{tags_json}\n\n## Questions\n{questions_json}\n"
        ),
    }
}

/// 基于文本回答问题
pub fn answer_prompt(language: Language, text: &str, question: &str) -> String {
    match language {
        Language::Zh => format!(
            "# 角色：微调数据集生成专家\n\
             请根据参考内容回答问题。答案必须基于参考内容，准确、完整，\n\
             但不要提及“参考内容”“文献”等字眼，直接给出答案。\n\n\
             ## 参考内容\n{text}\n\n## 问题\n{question}\n"
        ),
        Language::En => format!(
            "# Role: Fine-tuning Dataset Expert\n\
             Answer the question based on the reference content. The answer must be accurate and complete,\n\
             and must not mention \"the reference\" or \"the document\"; answer directly.\n\n\
             ## Reference\n{text}\n\n## Question\n{question}\n"
        ),
    }
}

/// 优化思维链，去掉对参考资料的引用
pub fn optimize_cot_prompt(
    language: Language,
    question: &str,
    answer: &str,
    cot: &str,
) -> String {
    match language {
        Language::Zh => format!(
            "# 角色：思维链优化专家\n\
             请改写下面的思维链：删除所有“根据文献”“参考资料指出”等引用描述，\n\
             改为正常的推理过程，推理结论必须与答案一致。只输出优化后的思维链。\n\n\
             ## 问题\n{question}\n\n## 答案\n{answer}\n\n## 原始思维链\n{cot}\n"
        ),
        Language::En => format!(
            "# Role: Chain-of-Thought Optimization Expert\n\
             Rewrite the chain of thought below: remove every reference to source material\n\
             (\"according to the document\", \"the reference says\", ...) and turn it into normal reasoning\n\
             that arrives at the given answer. Output only the optimized chain of thought.\n\n\
             ## Question\n{question}\n\n## Answer\n{answer}\n\n## Original chain of thought\n{cot}\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_embed_inputs_in_both_languages() {
        for language in [Language::Zh, Language::En] {
            let p = question_prompt(language, "TEXT-BODY", 4);
            assert!(p.contains("TEXT-BODY"));
            assert!(p.contains('4'));
            let p = answer_prompt(language, "REF", "Q?");
            assert!(p.contains("REF") && p.contains("Q?"));
            let p = label_prompt(language, "[\"t\"]", "[\"q\"]");
            assert!(p.contains("[\"t\"]") && p.contains("[\"q\"]"));
            let p = optimize_cot_prompt(language, "Q", "A", "C");
            assert!(p.contains("## "));
        }
    }
}
