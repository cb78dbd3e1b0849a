use super::PromptKind;

pub(super) const WRITING_ASSISTANT_SYSTEM: &str =
    "You are an AI writing assistant that helps users improve and extend text.";

const EDITOR_SYSTEM: &str = "You are a careful writing coach. You keep the writer's voice, \
     answer in the same language as the writer's text, and never add commentary \
     about yourself.";

const PROOFREADER_SYSTEM: &str = "You are a meticulous proofreader. You answer in the same \
     language as the text you are given and follow the requested output format exactly.";

const TONE_RULE: &str = "Requested tone: {tone}. If the tone is \"auto-detect\", infer the \
     most fitting tone from the text itself and keep it consistent.";

pub(super) fn system_for(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::Generate => WRITING_ASSISTANT_SYSTEM,
        PromptKind::Suggestion | PromptKind::Question | PromptKind::Prediction => EDITOR_SYSTEM,
        PromptKind::Correction | PromptKind::ErrorDetection => PROOFREADER_SYSTEM,
    }
}

pub(super) fn temperature_for(kind: PromptKind) -> f32 {
    match kind {
        PromptKind::Generate | PromptKind::Suggestion | PromptKind::Prediction => 0.7,
        PromptKind::Question => 0.8,
        PromptKind::Correction => 0.3,
        PromptKind::ErrorDetection => 0.2,
    }
}

pub(super) fn body_for(kind: PromptKind) -> String {
    match kind {
        PromptKind::Generate => "{input_text}".to_string(),
        PromptKind::Suggestion => format!(
            "Read the draft below and suggest how the writer could continue or improve it.\n\
             {TONE_RULE}\n\
             Give two or three concrete suggestions as a short numbered list. \
             Each suggestion is one or two sentences.\n\n\
             Draft:\n{{input_text}}"
        ),
        PromptKind::Question => format!(
            "Read the draft below and ask two or three questions that would help the writer \
             develop their ideas further.\n\
             {TONE_RULE}\n\
             Return only the questions, one per line.\n\n\
             Draft:\n{{input_text}}"
        ),
        PromptKind::Correction => format!(
            "Correct the spelling, grammar and awkward phrasing in the text below without \
             changing its meaning.\n\
             {TONE_RULE}\n\
             Return only the corrected text.\n\n\
             Text:\n{{input_text}}"
        ),
        PromptKind::ErrorDetection => format!(
            "Find the spelling, grammar, spacing and word-choice errors in the text below.\n\
             {TONE_RULE}\n\
             Answer with JSON only, in exactly this shape:\n\
             {{\"errors\": [{{\"original\": \"...\", \"corrected\": \"...\", \"type\": \"spelling|grammar|spacing|word-choice\", \"reason\": \"...\"}}], \"summary\": \"...\"}}\n\
             Use an empty \"errors\" array when the text has no errors.\n\n\
             Text:\n{{input_text}}"
        ),
        PromptKind::Prediction => format!(
            "Predict how the writer will most likely continue the text below.\n\
             {TONE_RULE}\n\
             Return only the continuation, at most two sentences, without repeating \
             the given text.\n\n\
             Text:\n{{input_text}}"
        ),
    }
}
