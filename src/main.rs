use architect_core::{
    load_config_or_default, scatter_points, Bound, CalculateIllumination, CubeVolume,
    ObjectRotator, PlantArchitectGizmosPlugin, PlantArchitectPlugin,
    TriangleIlluminationEstimator, VolumeRng,
};
use bevy::prelude::*;

const CONFIG_PATH: &str = "plant_architect.json";

fn main() {
    let config = load_config_or_default(CONFIG_PATH);

    let mut app = App::new();
    app.add_plugins(DefaultPlugins);
    config.apply(&mut app);
    app.add_plugins(PlantArchitectPlugin)
        .add_plugins(PlantArchitectGizmosPlugin)
        .insert_resource(ClearColor(Color::srgb(0.55, 0.7, 0.85)))
        .add_systems(Startup, setup)
        .add_systems(Update, request_illumination)
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut rng: ResMut<VolumeRng>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(5.0, 4.0, 7.0).looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(3.0, 8.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Vertex colors written by the estimator tint this white material.
    let plant_material = materials.add(Color::WHITE);
    let stem = meshes.add(Cylinder::new(0.05, 2.0));

    commands
        .spawn((
            TriangleIlluminationEstimator {
                display_probes: true,
                ..default()
            },
            Mesh3d(stem),
            MeshMaterial3d(plant_material.clone()),
            Transform::from_xyz(0.0, 1.0, 0.0),
        ))
        .with_children(|plant| {
            for i in 0..6 {
                let height = -0.6 + i as f32 * 0.3;
                let yaw = i as f32 * 2.4;
                let tilt = -0.3 - 0.15 * i as f32;
                // One asset per leaf so each keeps its own vertex colors.
                let leaf = meshes.add(Plane3d::default().mesh().size(0.8, 0.3));
                plant.spawn((
                    Mesh3d(leaf),
                    MeshMaterial3d(plant_material.clone()),
                    Transform::from_xyz(0.4 * yaw.cos(), height, -0.4 * yaw.sin())
                        .with_rotation(Quat::from_rotation_y(yaw) * Quat::from_rotation_z(tilt)),
                ));
            }
        });

    commands.spawn((
        ObjectRotator::new(Vec3::new(0.0, 45.0, 15.0), 1.0),
        Mesh3d(meshes.add(Cuboid::new(0.5, 0.5, 0.5))),
        MeshMaterial3d(materials.add(Color::srgb(0.8, 0.5, 0.2))),
        Transform::from_xyz(-2.5, 1.0, 0.0),
    ));

    let volume = CubeVolume {
        min_max_bound: Bound::new(Vec3::new(-1.5, 0.0, -1.5), Vec3::new(1.5, 0.2, 1.5)),
        display_bounds: true,
        ..default()
    };
    let volume_transform = Transform::from_xyz(2.5, 0.0, -1.0);
    let seed_mesh = meshes.add(Sphere::new(0.06));
    let seed_material = materials.add(Color::srgb(0.35, 0.6, 0.25));
    for point in scatter_points(
        &volume,
        &GlobalTransform::from(volume_transform),
        &mut rng.0,
        24,
    ) {
        commands.spawn((
            Mesh3d(seed_mesh.clone()),
            MeshMaterial3d(seed_material.clone()),
            Transform::from_translation(point),
        ));
    }
    commands.spawn((volume, volume_transform));

    info!("Press Space to estimate plant illumination");
}

fn request_illumination(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    estimators: Query<Entity, With<TriangleIlluminationEstimator>>,
) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    for entity in &estimators {
        commands.entity(entity).insert(CalculateIllumination::default());
    }
}
