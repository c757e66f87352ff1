use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Ui};

use crate::color::fixed_color;
use crate::data::aggregate::TopicNode;

const TREEMAP_HEIGHT: f32 = 320.0;
const TOPIC_HEADER: f32 = 14.0;

/// One positioned treemap cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub rect: Rect,
    pub topic: String,
    pub region: String,
    pub mean: f64,
}

/// Split `len` proportionally to `weights`, returning `(start, size)` pairs.
fn split(start: f32, len: f32, weights: &[f64]) -> Vec<(f32, f32)> {
    let total: f64 = weights.iter().sum();
    let mut offset = start;
    weights
        .iter()
        .map(|w| {
            let size = if total > 0.0 {
                (w / total) as f32 * len
            } else {
                0.0
            };
            let slot = (offset, size);
            offset += size;
            slot
        })
        .collect()
}

/// Slice-and-dice layout: topics side by side, regions stacked inside each.
pub fn layout(nodes: &[TopicNode], area: Rect) -> Vec<(Rect, Vec<Tile>)> {
    let totals: Vec<f64> = nodes.iter().map(TopicNode::total).collect();

    nodes
        .iter()
        .zip(split(area.left(), area.width(), &totals))
        .map(|(node, (x, w))| {
            let outer = Rect::from_min_size(Pos2::new(x, area.top()), egui::vec2(w, area.height()));
            let inner = Rect::from_min_max(
                Pos2::new(outer.left() + 1.0, outer.top() + TOPIC_HEADER),
                Pos2::new(outer.right() - 1.0, outer.bottom() - 1.0),
            );
            let means: Vec<f64> = node.regions.iter().map(|r| r.mean).collect();
            let tiles = node
                .regions
                .iter()
                .zip(split(inner.top(), inner.height(), &means))
                .map(|(leaf, (y, h))| Tile {
                    rect: Rect::from_min_size(Pos2::new(inner.left(), y), egui::vec2(inner.width(), h))
                        .shrink(0.5),
                    topic: node.topic.clone(),
                    region: leaf.region.clone(),
                    mean: leaf.mean,
                })
                .collect();
            (outer, tiles)
        })
        .collect()
}

/// Paint the topic/region treemap; hovering a tile shows its mean.
pub fn treemap(ui: &mut Ui, nodes: &[TopicNode]) {
    if nodes.is_empty() {
        ui.allocate_ui(egui::vec2(ui.available_width(), TREEMAP_HEIGHT), |ui: &mut Ui| {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.weak("No data for this selection");
            });
        });
        return;
    }

    let size = egui::vec2(ui.available_width(), TREEMAP_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let text_color = ui.visuals().strong_text_color();
    let font = FontId::proportional(11.0);

    let mut hovered = None;
    for (outer, tiles) in layout(nodes, response.rect) {
        if let Some(first) = tiles.first() {
            painter.text(
                outer.left_top() + egui::vec2(3.0, 1.0),
                Align2::LEFT_TOP,
                &first.topic,
                font.clone(),
                text_color,
            );
        }
        for tile in tiles {
            let color = fixed_color(&tile.region).unwrap_or(Color32::GRAY);
            painter.rect_filled(tile.rect, 0.0, color);
            if tile.rect.height() > 14.0 && tile.rect.width() > 30.0 {
                painter.text(
                    tile.rect.left_top() + egui::vec2(3.0, 2.0),
                    Align2::LEFT_TOP,
                    &tile.region,
                    font.clone(),
                    Color32::BLACK,
                );
            }
            if response.hover_pos().is_some_and(|p| tile.rect.contains(p)) {
                hovered = Some(tile);
            }
        }
    }

    if let Some(tile) = hovered {
        response.on_hover_text(format!("{} – {}: {:.2}", tile.topic, tile.region, tile.mean));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::RegionLeaf;

    fn node(topic: &str, means: &[(&str, f64)]) -> TopicNode {
        TopicNode {
            topic: topic.into(),
            regions: means
                .iter()
                .map(|(r, m)| RegionLeaf {
                    region: r.to_string(),
                    mean: *m,
                })
                .collect(),
        }
    }

    #[test]
    fn topic_widths_follow_totals() {
        let nodes = vec![node("A", &[("South", 30.0)]), node("B", &[("West", 10.0)])];
        let area = Rect::from_min_size(Pos2::ZERO, egui::vec2(400.0, 200.0));
        let laid = layout(&nodes, area);
        assert_eq!(laid.len(), 2);
        assert!((laid[0].0.width() - 300.0).abs() < 1e-3);
        assert!((laid[1].0.left() - 300.0).abs() < 1e-3);
    }

    #[test]
    fn region_heights_follow_means() {
        let nodes = vec![node("A", &[("South", 3.0), ("West", 1.0)])];
        let area = Rect::from_min_size(Pos2::ZERO, egui::vec2(100.0, 200.0));
        let tiles = &layout(&nodes, area)[0].1;
        assert_eq!(tiles.len(), 2);
        assert!(tiles[0].rect.height() > tiles[1].rect.height() * 2.5);
        assert_eq!(tiles[1].region, "West");
    }
}
