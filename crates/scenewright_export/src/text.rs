//! Text exports.

use scenewright_core::{Scene, Screenplay};

const SCENE_SEPARATOR: &str = "\n\n---\n";

/// Render the screenplay as text, one block per scene.
///
/// Blank dialogue is left out of a scene's block.
///
/// # Examples
///
/// ```
/// use scenewright_core::{RawScene, RawScreenplay, Screenplay};
/// use scenewright_export::script_text;
///
/// let screenplay = Screenplay::from_raw(RawScreenplay {
///     title: "The Bottle".to_string(),
///     thumbnail_prompt: "A bottle".to_string(),
///     scenes: vec![RawScene {
///         scene_number: 1,
///         setting: "EXT. SHORE - DUSK".to_string(),
///         action: "A wave deposits a bottle.".to_string(),
///         dialogue_vo: String::new(),
///     }],
/// })
/// .unwrap();
///
/// let text = script_text(&screenplay);
/// assert!(text.starts_with("# The Bottle"));
/// assert!(text.contains("## SCENE 1\n**Setting:** EXT. SHORE - DUSK"));
/// ```
pub fn script_text(screenplay: &Screenplay) -> String {
    let scenes = screenplay
        .scenes()
        .iter()
        .map(scene_block)
        .collect::<Vec<_>>()
        .join(SCENE_SEPARATOR);
    format!("# {}\n\n{}\n", screenplay.title(), scenes)
}

fn scene_block(scene: &Scene) -> String {
    let mut block = format!(
        "## SCENE {}\n**Setting:** {}\n\n**Action:**\n{}",
        scene.scene_number(),
        scene.setting().trim(),
        scene.action().trim()
    );
    let dialogue = scene.dialogue_or_voiceover().trim();
    if !dialogue.is_empty() {
        block.push_str("\n\n**Dialogue / VO:**\n");
        block.push_str(dialogue);
    }
    block
}

/// Render every scene boundary's transition as a markdown entry.
///
/// The final scene has no boundary and is skipped, as is any scene whose
/// transition has not been generated yet.
pub fn transitions_markdown(screenplay: &Screenplay) -> String {
    let scenes = screenplay.scenes();
    let entries: Vec<String> = scenes
        .iter()
        .zip(scenes.iter().skip(1))
        .filter_map(|(from, to)| {
            let prompt = from.transition_prompt().as_deref()?.trim();
            if prompt.is_empty() {
                return None;
            }
            let quoted = prompt
                .lines()
                .map(|line| format!("> {}", line).trim_end().to_string())
                .collect::<Vec<_>>()
                .join("\n");
            Some(format!(
                "### Transition from Scene {} to {}\n{}",
                from.scene_number(),
                to.scene_number(),
                quoted
            ))
        })
        .collect();

    if entries.is_empty() {
        String::new()
    } else {
        format!("{}\n", entries.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenewright_core::{RawScene, RawScreenplay};

    fn screenplay() -> Screenplay {
        let scenes = (1..=3)
            .map(|n| RawScene {
                scene_number: n,
                setting: format!("LOCATION {}", n),
                action: format!("Action {}.", n),
                dialogue_vo: if n == 2 {
                    "KEEPER: Who sent this?".to_string()
                } else {
                    String::new()
                },
            })
            .collect();
        Screenplay::from_raw(RawScreenplay {
            title: "The Bottle".to_string(),
            thumbnail_prompt: "A bottle".to_string(),
            scenes,
        })
        .unwrap()
    }

    #[test]
    fn test_script_blocks_are_separated() {
        let text = script_text(&screenplay());

        assert_eq!(text.matches("\n\n---\n").count(), 2);
        assert!(text.contains("## SCENE 3\n**Setting:** LOCATION 3\n\n**Action:**\nAction 3."));
        assert!(text.contains("**Dialogue / VO:**\nKEEPER: Who sent this?"));
        assert_eq!(text.matches("**Dialogue / VO:**").count(), 1);
    }

    #[test]
    fn test_transitions_skip_final_scene() {
        let mut screenplay = screenplay();
        for (index, scene) in screenplay.scenes_mut().iter_mut().enumerate() {
            scene.set_visuals(
                format!("Keyframe {}", index + 1),
                Some(format!("MATCH CUT {}", index + 1)),
            );
        }

        let markdown = transitions_markdown(&screenplay);

        assert_eq!(
            markdown,
            "### Transition from Scene 1 to 2\n> MATCH CUT 1\n\n### Transition from Scene 2 to 3\n> MATCH CUT 2\n"
        );
    }

    #[test]
    fn test_transitions_quote_every_line() {
        let mut screenplay = screenplay();
        screenplay.scenes_mut()[0]
            .set_visuals("Keyframe".to_string(), Some("SLOW DISSOLVE\n\ninto fog".to_string()));

        let markdown = transitions_markdown(&screenplay);

        assert_eq!(
            markdown,
            "### Transition from Scene 1 to 2\n> SLOW DISSOLVE\n>\n> into fog\n"
        );
    }

    #[test]
    fn test_no_transitions_before_enrichment() {
        assert_eq!(transitions_markdown(&screenplay()), "");
    }
}
