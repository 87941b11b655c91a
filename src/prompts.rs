//! Prompt templates for the studio render views.

use crate::ai::OutputView;

pub const STUDIO_FRONT: &str = "Extract the clothing item from the reference image and place it on a professional white mannequin in a studio setting, front view. Create a photorealistic product photography with white seamless background, soft diffused lighting, centered composition, high resolution 8k quality. The clothing should be perfectly fitted on the mannequin, showing all details clearly with clean and minimalist aesthetic.";

pub const STUDIO_BACK: &str = "Extract the clothing item from the reference image and place it on a professional white mannequin in a studio setting, back view. Create a photorealistic product photography with white seamless background, soft diffused lighting, centered composition, high resolution 8k quality. The clothing should be perfectly fitted on the mannequin, showing the back details clearly with clean and minimalist aesthetic.";

pub const LIFESTYLE: &str = "Extract the clothing item from the reference image and show it being worn by a real person (model) in a natural lifestyle setting. The clothing should look natural and well-fitted on the person. Create a photorealistic lifestyle photography with casual outdoor environment, natural lighting, candid pose, high quality 8k resolution, authentic and relatable, modern fashion photography style.";

/// The prompt sent to the image provider for a given view.
pub fn for_view(view: OutputView) -> &'static str {
    match view {
        OutputView::Front => STUDIO_FRONT,
        OutputView::Back => STUDIO_BACK,
        OutputView::RealSituation => LIFESTYLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_non_empty() {
        assert!(!STUDIO_FRONT.is_empty());
        assert!(!STUDIO_BACK.is_empty());
        assert!(!LIFESTYLE.is_empty());
    }

    #[test]
    fn test_each_view_has_a_distinct_prompt() {
        let prompts: Vec<_> = OutputView::ALL.iter().map(|v| for_view(*v)).collect();
        assert_ne!(prompts[0], prompts[1]);
        assert_ne!(prompts[1], prompts[2]);
        assert_ne!(prompts[0], prompts[2]);
    }

    #[test]
    fn test_view_prompts_match_their_subject() {
        assert!(for_view(OutputView::Front).contains("front view"));
        assert!(for_view(OutputView::Back).contains("back view"));
        assert!(for_view(OutputView::RealSituation).contains("lifestyle"));
    }
}
