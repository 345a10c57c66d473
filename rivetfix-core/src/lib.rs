pub mod geometry {
    use glam::{DVec2, DVec3};

    /// 二维点，内部以 `glam::DVec2` 表示。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn vector_to(self, other: Point2) -> Vector2 {
            Vector2(other.0 - self.0)
        }

        #[inline]
        pub fn distance(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }
    }

    /// 二维向量。零向量在本库中作为“无方向”的哨兵值使用。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        pub const ZERO: Vector2 = Vector2(DVec2::ZERO);

        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point2, end: Point2) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn length_squared(self) -> f64 {
            self.0.length_squared()
        }

        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        #[inline]
        pub fn dot(self, other: Vector2) -> f64 {
            self.0.dot(other.0)
        }

        #[inline]
        pub fn scale(self, factor: f64) -> Self {
            Self(self.0 * factor)
        }

        /// 严格等于零向量（不做容差比较）。
        #[inline]
        pub fn is_zero(self) -> bool {
            self.0 == DVec2::ZERO
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    /// 三维点。孔的圆心携带 Z（标高），校正时只改写 XY。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Point3(pub DVec3);

    impl Point3 {
        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn z(self) -> f64 {
            self.0.z
        }

        /// 投影到 XY 平面。
        #[inline]
        pub fn xy(self) -> Point2 {
            Point2::new(self.0.x, self.0.y)
        }

        /// 替换 XY，保留原有 Z。
        #[inline]
        pub fn with_xy(self, xy: Point2) -> Self {
            Self(DVec3::new(xy.x(), xy.y(), self.0.z))
        }
    }

    /// 点到线段的最近距离，以及从线段最近点指向该点的单位方向。
    ///
    /// 当方向无定义（退化线段，或点恰好落在线段上）时，`direction` 为零向量。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Proximity {
        pub distance: f64,
        pub direction: Vector2,
    }

    impl Proximity {
        #[inline]
        pub fn has_direction(&self) -> bool {
            !self.direction.is_zero()
        }
    }

    /// 有向二维线段（直边）。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Segment2 {
        pub start: Point2,
        pub end: Point2,
    }

    impl Segment2 {
        #[inline]
        pub fn new(start: Point2, end: Point2) -> Self {
            Self { start, end }
        }

        #[inline]
        pub fn length_squared(&self) -> f64 {
            Vector2::from_points(self.start, self.end).length_squared()
        }

        /// 起点与终点完全重合（平方长度严格为零）。
        #[inline]
        pub fn is_degenerate(&self) -> bool {
            self.length_squared() == 0.0
        }

        /// 线段上距离 `point` 最近的点，投影参数被夹在 `[0, 1]` 内。
        pub fn closest_point(&self, point: Point2) -> Point2 {
            let axis = Vector2::from_points(self.start, self.end);
            let length_sq = axis.length_squared();
            if length_sq == 0.0 {
                return self.start;
            }
            let t = (self.start.vector_to(point).dot(axis) / length_sq).clamp(0.0, 1.0);
            self.start.translate(axis.scale(t))
        }

        pub fn proximity(&self, point: Point2) -> Proximity {
            distance_and_direction(point, self.start, self.end)
        }
    }

    /// 计算点到线段的距离与垂直方向。
    ///
    /// - 退化线段：返回到该点的欧氏距离，方向为零向量；
    /// - 其余情况：投影参数夹在 `[0, 1]`，方向从最近点指向 `point`，
    ///   投影落在线段内部时即为法向，否则指向最近端点一侧；
    /// - 距离恰为 0 时方向同样为零向量。
    pub fn distance_and_direction(point: Point2, start: Point2, end: Point2) -> Proximity {
        let axis = Vector2::from_points(start, end);
        let length_sq = axis.length_squared();

        if length_sq == 0.0 {
            return Proximity {
                distance: point.distance(start),
                direction: Vector2::ZERO,
            };
        }

        let t = (start.vector_to(point).dot(axis) / length_sq).clamp(0.0, 1.0);
        let closest = start.translate(axis.scale(t));
        let offset = closest.vector_to(point);
        let distance = offset.length();

        let direction = if distance > 0.0 {
            offset.scale(1.0 / distance)
        } else {
            Vector2::ZERO
        };

        Proximity {
            distance,
            direction,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use proptest::prelude::*;

        const EPS: f64 = 1e-9;

        #[test]
        fn perpendicular_from_segment_interior() {
            let result = distance_and_direction(
                Point2::new(5.0, 3.0),
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
            );
            assert!((result.distance - 3.0).abs() < EPS);
            assert!((result.direction.x()).abs() < EPS);
            assert!((result.direction.y() - 1.0).abs() < EPS);
        }

        #[test]
        fn direction_points_away_from_edge_on_either_side() {
            let start = Point2::new(0.0, 0.0);
            let end = Point2::new(0.0, 100.0);
            let right = distance_and_direction(Point2::new(30.0, 50.0), start, end);
            let left = distance_and_direction(Point2::new(-30.0, 50.0), start, end);
            assert!((right.direction.x() - 1.0).abs() < EPS);
            assert!((left.direction.x() + 1.0).abs() < EPS);
            assert!((right.distance - left.distance).abs() < EPS);
        }

        #[test]
        fn projection_beyond_end_points_toward_nearest_endpoint() {
            let result = distance_and_direction(
                Point2::new(13.0, 4.0),
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
            );
            assert!((result.distance - 5.0).abs() < EPS);
            assert!((result.direction.x() - 0.6).abs() < EPS);
            assert!((result.direction.y() - 0.8).abs() < EPS);
        }

        #[test]
        fn point_on_segment_has_no_direction() {
            let start = Point2::new(-4.0, 2.0);
            let end = Point2::new(4.0, 2.0);
            for point in [start, end, Point2::new(0.0, 2.0), Point2::new(2.5, 2.0)] {
                let result = distance_and_direction(point, start, end);
                assert_eq!(result.distance, 0.0);
                assert!(!result.has_direction());
            }
        }

        #[test]
        fn degenerate_segment_measures_to_single_point() {
            let anchor = Point2::new(1.0, 1.0);
            let result = distance_and_direction(Point2::new(4.0, 5.0), anchor, anchor);
            assert!((result.distance - 5.0).abs() < EPS);
            assert!(result.direction.is_zero());
            assert!(Segment2::new(anchor, anchor).is_degenerate());
        }

        #[test]
        fn point3_with_xy_keeps_elevation() {
            let moved = Point3::new(1.0, 2.0, 7.5).with_xy(Point2::new(-3.0, 4.0));
            assert_eq!(moved, Point3::new(-3.0, 4.0, 7.5));
        }

        fn coord() -> impl Strategy<Value = f64> {
            -1.0e4..1.0e4f64
        }

        fn integral() -> impl Strategy<Value = f64> {
            (-100_000i32..100_000).prop_map(f64::from)
        }

        proptest! {
            #[test]
            fn endpoints_lie_on_segment(
                x1 in integral(), y1 in integral(), x2 in integral(), y2 in integral()
            ) {
                let start = Point2::new(x1, y1);
                let end = Point2::new(x2, y2);
                for point in [start, end] {
                    let result = distance_and_direction(point, start, end);
                    prop_assert_eq!(result.distance, 0.0);
                    prop_assert!(result.direction.is_zero());
                }
            }

            #[test]
            fn degenerate_segment_never_has_direction(
                px in coord(), py in coord(), x in coord(), y in coord()
            ) {
                let anchor = Point2::new(x, y);
                let result = distance_and_direction(Point2::new(px, py), anchor, anchor);
                prop_assert!(result.direction.is_zero());
                prop_assert!(result.distance >= 0.0);
            }

            #[test]
            fn distance_and_direction_reconstruct_closest_point(
                px in coord(), py in coord(),
                x1 in coord(), y1 in coord(), x2 in coord(), y2 in coord()
            ) {
                let point = Point2::new(px, py);
                let segment = Segment2::new(Point2::new(x1, y1), Point2::new(x2, y2));
                prop_assume!(!segment.is_degenerate());

                let result = segment.proximity(point);
                prop_assert!(result.distance >= 0.0);

                let length = result.direction.length();
                prop_assert!(result.direction.is_zero() || (length - 1.0).abs() < 1e-9);

                let rebuilt = point.translate(result.direction.scale(-result.distance));
                let expected = segment.closest_point(point);
                prop_assert!(rebuilt.distance(expected) < 1e-6);

                prop_assert!(result.distance <= point.distance(segment.start) + 1e-9);
                prop_assert!(result.distance <= point.distance(segment.end) + 1e-9);
            }
        }
    }
}

pub mod document {
    use crate::geometry::{Point2, Point3, Segment2};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntityId(u64);

    impl EntityId {
        #[inline]
        pub fn new(raw: u64) -> Self {
            Self(raw)
        }

        /// 提供原始数值，便于序列化或日志输出。
        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    /// 零件轮廓上的一条直边。Z 坐标不参与计算。
    #[derive(Debug, Clone)]
    pub struct Line {
        pub start: Point2,
        pub end: Point2,
        pub layer: String,
    }

    impl Line {
        #[inline]
        pub fn segment(&self) -> Segment2 {
            Segment2::new(self.start, self.end)
        }
    }

    /// 圆形孔。
    #[derive(Debug, Clone)]
    pub struct Circle {
        pub center: Point3,
        pub radius: f64,
        pub layer: String,
    }

    impl Circle {
        #[inline]
        pub fn diameter(&self) -> f64 {
            self.radius * 2.0
        }
    }

    #[derive(Debug, Clone)]
    pub enum Entity {
        Line(Line),
        Circle(Circle),
    }

    impl Entity {
        #[inline]
        pub fn layer_name(&self) -> &str {
            match self {
                Entity::Line(line) => &line.layer,
                Entity::Circle(circle) => &circle.layer,
            }
        }
    }

    /// 图纸的几何视图：按文件顺序保存直边与圆孔。
    #[derive(Debug, Default, Clone)]
    pub struct Document {
        entities: Vec<(EntityId, Entity)>,
        next_entity_id: u64,
    }

    impl Document {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_line(
            &mut self,
            start: Point2,
            end: Point2,
            layer: impl Into<String>,
        ) -> EntityId {
            let layer = layer.into();
            let id = self.next_id();
            self.entities
                .push((id, Entity::Line(Line { start, end, layer })));
            id
        }

        pub fn add_circle(
            &mut self,
            center: Point3,
            radius: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            let layer = layer.into();
            let id = self.next_id();
            self.entities.push((
                id,
                Entity::Circle(Circle {
                    center,
                    radius,
                    layer,
                }),
            ));
            id
        }

        pub fn entities(&self) -> impl Iterator<Item = &(EntityId, Entity)> {
            self.entities.iter()
        }

        pub fn entity(&self, id: EntityId) -> Option<&Entity> {
            self.entities
                .iter()
                .find_map(|(entity_id, entity)| (*entity_id == id).then_some(entity))
        }

        /// 按文件顺序返回所有直边。
        pub fn edges(&self) -> Vec<Segment2> {
            self.entities
                .iter()
                .filter_map(|(_, entity)| match entity {
                    Entity::Line(line) => Some(line.segment()),
                    _ => None,
                })
                .collect()
        }

        pub fn circles(&self) -> impl Iterator<Item = (EntityId, &Circle)> {
            self.entities.iter().filter_map(|(id, entity)| match entity {
                Entity::Circle(circle) => Some((*id, circle)),
                _ => None,
            })
        }

        #[inline]
        pub fn circle_count(&self) -> usize {
            self.circles().count()
        }

        /// 把圆心移动到新的 XY 位置，Z 保持不变。返回移动前的圆心。
        pub fn move_circle(&mut self, id: EntityId, xy: Point2) -> Option<Point3> {
            self.entities.iter_mut().find_map(|(entity_id, entity)| {
                match entity {
                    Entity::Circle(circle) if *entity_id == id => {
                        let previous = circle.center;
                        circle.center = previous.with_xy(xy);
                        Some(previous)
                    }
                    _ => None,
                }
            })
        }

        fn next_id(&mut self) -> EntityId {
            let id = self.next_entity_id;
            self.next_entity_id += 1;
            EntityId(id)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn document_keeps_file_order() {
            let mut doc = Document::new();
            let first = doc.add_line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), "0");
            let hole = doc.add_circle(Point3::new(5.0, 5.0, 0.0), 2.1, "HOLES");
            let second = doc.add_line(Point2::new(10.0, 0.0), Point2::new(10.0, 10.0), "0");

            let ids: Vec<u64> = doc.entities().map(|(id, _)| id.get()).collect();
            assert_eq!(ids, vec![first.get(), hole.get(), second.get()]);

            let edges = doc.edges();
            assert_eq!(edges.len(), 2);
            assert_eq!(edges[1].start, Point2::new(10.0, 0.0));
            assert_eq!(doc.circle_count(), 1);
            assert_eq!(doc.entity(hole).map(Entity::layer_name), Some("HOLES"));
        }

        #[test]
        fn move_circle_preserves_z() {
            let mut doc = Document::new();
            let line = doc.add_line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), "0");
            let hole = doc.add_circle(Point3::new(1.0, 2.0, 3.0), 2.1, "0");

            let previous = doc.move_circle(hole, Point2::new(-19.0, 2.0));
            assert_eq!(previous, Some(Point3::new(1.0, 2.0, 3.0)));

            let (_, circle) = doc.circles().next().expect("circle exists");
            assert_eq!(circle.center, Point3::new(-19.0, 2.0, 3.0));
            assert!((circle.diameter() - 4.2).abs() < 1e-12);

            assert!(doc.move_circle(line, Point2::new(0.0, 0.0)).is_none());
            assert!(doc.move_circle(EntityId::new(99), Point2::new(0.0, 0.0)).is_none());
        }
    }
}
