//! Prompt templates for each generation stage.
//!
//! Every function here is pure: it renders scenes or user text into the
//! instruction a generation request carries.

use scenewright_core::{Scene, StoryIdea};
use serde_json::{Value, json};

/// Transition used when no request is issued (final scene) or the model returns nothing.
pub const CUT_TO: &str = "CUT TO:";

/// Instruction for turning a story idea into a structured screenplay.
pub fn script_prompt(idea: &StoryIdea) -> String {
    format!(
        "You are a professional screenplay writer. Your task is to take a story idea and turn it into a screenplay.\n\
         The screenplay must be broken down into individual scenes. Each scene should represent approximately 8 seconds of screen time.\n\
         Format your response as a JSON object with the keys \"title\", \"thumbnail_prompt\" and \"scenes\".\n\
         - \"title\": A short title for the story.\n\
         - \"thumbnail_prompt\": A visual prompt for a title card image that captures the story.\n\
         - \"scenes\": An array of scene objects, each with:\n\
         \x20 - \"scene_number\": An integer for the scene number, starting from 1.\n\
         \x20 - \"setting\": The location and time (e.g., \"INT. COFFEE SHOP - DAY\").\n\
         \x20 - \"action\": What happens on screen. Keep it concise for an 8-second duration.\n\
         \x20 - \"dialogue_vo\": Any dialogue or voiceover, or an empty string.\n\
         \n\
         Here is the story idea:\n\
         ---\n\
         {}\n\
         ---\n\
         Generate the screenplay now.",
        idea.as_str()
    )
}

/// Response schema for [`script_prompt`].
pub fn screenplay_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "thumbnail_prompt": { "type": "STRING" },
            "scenes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "scene_number": { "type": "INTEGER" },
                        "setting": { "type": "STRING" },
                        "action": { "type": "STRING" },
                        "dialogue_vo": { "type": "STRING" }
                    },
                    "required": ["scene_number", "setting", "action", "dialogue_vo"]
                }
            }
        },
        "required": ["title", "thumbnail_prompt", "scenes"]
    })
}

fn scene_block(scene: &Scene) -> String {
    format!(
        "Setting: {}\nAction: {}\nDialogue/VO: {}",
        scene.setting(),
        scene.action(),
        scene.dialogue_or_voiceover()
    )
}

/// Instruction for deriving a keyframe image prompt from a scene.
pub fn visual_prompt(scene: &Scene) -> String {
    format!(
        "You are a visual artist creating a keyframe for a movie scene. Based on the following scene description, \
         create a detailed and concise visual prompt for an AI image generator. The prompt should capture the mood, \
         characters, setting, and key action.\n\
         ---\n\
         {}\n\
         ---\n\
         Generate the visual prompt.",
        scene_block(scene)
    )
}

/// Instruction for describing the transition between two consecutive scenes.
pub fn transition_prompt(from: &Scene, to: &Scene) -> String {
    format!(
        "You are a film editor. Describe a cinematic transition between the following two scenes.\n\
         ---\n\
         From Scene:\n\
         {}\n\
         ---\n\
         To Scene:\n\
         {}\n\
         ---\n\
         Generate a concise transition prompt (e.g., \"MATCH CUT to a spinning wheel\", \"SMASH CUT to black\", \
         \"SLOW DISSOLVE to the next scene\").",
        scene_block(from),
        scene_block(to)
    )
}

/// Text part of a create-mode image request.
///
/// With references the prompt is rewritten to point the model at them; without
/// references it is sent unmodified.
pub fn create_instruction(prompt: &str, has_references: bool) -> String {
    if has_references {
        format!(
            "Using the character(s) in the provided image(s) as a reference, create an image for the following prompt: {}",
            prompt
        )
    } else {
        prompt.to_string()
    }
}

/// Text part of an edit-mode image request.
pub fn edit_instruction(instruction: &str, has_references: bool) -> String {
    if has_references {
        format!(
            "Using the reference characters, apply this edit: {}",
            instruction
        )
    } else {
        instruction.to_string()
    }
}
